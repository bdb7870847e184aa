use std::fmt;
use std::fmt::{Display, Formatter};

/// Weather quantities a model can be trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherParameter {
    Temperature,
    Humidity,
    Wind,
}

impl WeatherParameter {
    pub const ALL: [WeatherParameter; 3] = [
        WeatherParameter::Temperature,
        WeatherParameter::Humidity,
        WeatherParameter::Wind,
    ];

    /// Parses the parameter segment of a model file name (`Hanoi_temperature` → `temperature`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "temperature" => Some(WeatherParameter::Temperature),
            "humidity" => Some(WeatherParameter::Humidity),
            "wind" => Some(WeatherParameter::Wind),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeatherParameter::Temperature => "temperature",
            WeatherParameter::Humidity => "humidity",
            WeatherParameter::Wind => "wind",
        }
    }

    /// Column holding this parameter in a city CSV file.
    pub fn column(self) -> &'static str {
        match self {
            WeatherParameter::Temperature => "temperature_avg",
            WeatherParameter::Humidity => "humidity_avg",
            WeatherParameter::Wind => "wind_speed_max",
        }
    }
}

impl Display for WeatherParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolves a parameter name to its CSV column. Unknown names are taken to be column names already.
pub fn data_column(parameter: &str) -> &str {
    WeatherParameter::from_name(parameter)
        .map(WeatherParameter::column)
        .unwrap_or(parameter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_parameters_map_to_columns() {
        assert_eq!(data_column("temperature"), "temperature_avg");
        assert_eq!(data_column("humidity"), "humidity_avg");
        assert_eq!(data_column("wind"), "wind_speed_max");
    }

    #[test]
    fn test_unknown_parameter_passes_through() {
        assert_eq!(data_column("wind_speed_max"), "wind_speed_max");
        assert_eq!(data_column("pressure"), "pressure");
    }

    #[test]
    fn test_name_round_trip() {
        for parameter in WeatherParameter::ALL {
            let name = parameter.name();
            assert_eq!(WeatherParameter::from_name(name), Some(parameter));
        }
    }
}
