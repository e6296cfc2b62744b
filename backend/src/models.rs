use serde::{Deserialize, Serialize};

/// Parameters entered on the prediction form.
///
/// Every field is free text and defaults to the empty string. The two select
/// fields hold an option identifier once chosen.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FormInput {
    pub latitude: String,
    pub longitude: String,
    pub country: String,
    pub city: String,
    pub depth: String,
    pub magnitude: String,
}

impl FormInput {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
            Field::Country => &self.country,
            Field::City => &self.city,
            Field::Depth => &self.depth,
            Field::Magnitude => &self.magnitude,
        }
    }

    /// Replaces one field, leaving the others untouched.
    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Latitude => &mut self.latitude,
            Field::Longitude => &mut self.longitude,
            Field::Country => &mut self.country,
            Field::City => &mut self.city,
            Field::Depth => &mut self.depth,
            Field::Magnitude => &mut self.magnitude,
        };
        *slot = value;
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Latitude,
    Longitude,
    Country,
    City,
    Depth,
    Magnitude,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Latitude,
        Field::Longitude,
        Field::Country,
        Field::City,
        Field::Depth,
        Field::Magnitude,
    ];

    /// Fields edited through a free text input.
    pub const TEXT: [Field; 4] = [
        Field::Latitude,
        Field::Longitude,
        Field::Depth,
        Field::Magnitude,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::Country => "country",
            Field::City => "city",
            Field::Depth => "depth",
            Field::Magnitude => "magnitude",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::Country => "Country",
            Field::City => "City",
            Field::Depth => "Depth",
            Field::Magnitude => "Magnitude",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Latitude => "Enter latitude",
            Field::Longitude => "Enter longitude",
            Field::Country => "Select country",
            Field::City => "Select city",
            Field::Depth => "Enter depth",
            Field::Magnitude => "Enter magnitude",
        }
    }
}

/// A fixed option offered by one of the select fields.
pub trait FormOption: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn id(self) -> &'static str;
    fn label(self) -> &'static str;

    fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|option| option.id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    Usa,
    Japan,
    Chile,
}

impl FormOption for Country {
    const ALL: &'static [Self] = &[Country::Usa, Country::Japan, Country::Chile];

    fn id(self) -> &'static str {
        match self {
            Country::Usa => "usa",
            Country::Japan => "japan",
            Country::Chile => "chile",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Country::Usa => "United States",
            Country::Japan => "Japan",
            Country::Chile => "Chile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum City {
    SanFrancisco,
    Tokyo,
    Santiago,
}

impl FormOption for City {
    const ALL: &'static [Self] = &[City::SanFrancisco, City::Tokyo, City::Santiago];

    fn id(self) -> &'static str {
        match self {
            City::SanFrancisco => "san-francisco",
            City::Tokyo => "tokyo",
            City::Santiago => "santiago",
        }
    }

    fn label(self) -> &'static str {
        match self {
            City::SanFrancisco => "San Francisco",
            City::Tokyo => "Tokyo",
            City::Santiago => "Santiago",
        }
    }
}

/// The two fields backed by a fixed option list.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelectField {
    Country,
    City,
}

impl SelectField {
    pub fn field(self) -> Field {
        match self {
            SelectField::Country => Field::Country,
            SelectField::City => Field::City,
        }
    }
}

/// A chosen option for one of the select fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Country(Country),
    City(City),
}

impl Selection {
    /// Resolves an option identifier for the given select field.
    pub fn parse(field: SelectField, id: &str) -> Option<Self> {
        match field {
            SelectField::Country => Country::from_id(id).map(Selection::Country),
            SelectField::City => City::from_id(id).map(Selection::City),
        }
    }

    pub fn field(self) -> Field {
        match self {
            Selection::Country(_) => Field::Country,
            Selection::City(_) => Field::City,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Selection::Country(country) => country.id(),
            Selection::City(city) => city.id(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub predicted_magnitude: f64,
    pub expected_depth: u32,
    pub probability_of_occurrence: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_input_defaults_to_empty_strings() {
        let input = FormInput::default();
        for field in Field::ALL {
            assert_eq!(input.get(field), "");
        }
    }

    #[test]
    fn set_touches_only_the_named_field() {
        let mut input = FormInput::default();
        input.set(Field::Depth, "8".to_string());

        for field in Field::ALL {
            let expected = if field == Field::Depth { "8" } else { "" };
            assert_eq!(input.get(field), expected, "field {}", field.name());
        }
    }

    #[test]
    fn selection_accepts_only_known_option_ids() {
        assert_eq!(
            Selection::parse(SelectField::Country, "japan"),
            Some(Selection::Country(Country::Japan))
        );
        assert_eq!(
            Selection::parse(SelectField::City, "san-francisco"),
            Some(Selection::City(City::SanFrancisco))
        );
        assert_eq!(Selection::parse(SelectField::City, "usa"), None);
        assert_eq!(Selection::parse(SelectField::Country, ""), None);
    }

    #[test]
    fn prediction_serializes_with_camel_case_keys() {
        let prediction = PredictionResult {
            predicted_magnitude: 6.5,
            expected_depth: 10,
            probability_of_occurrence: "75%".to_string(),
        };
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "predictedMagnitude": 6.5,
                "expectedDepth": 10,
                "probabilityOfOccurrence": "75%"
            })
        );
    }

    #[test]
    fn partial_form_body_fills_missing_fields() {
        let input: FormInput = serde_json::from_str(r#"{"city": "tokyo"}"#).unwrap();
        assert_eq!(input.city, "tokyo");
        assert_eq!(input.latitude, "");
    }
}
