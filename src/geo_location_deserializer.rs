use crate::domain::GeoLocation;
use serde::de::Error;
use serde::{Deserialize, Deserializer};

impl<'de> Deserialize<'de> for GeoLocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Debug, Deserialize)]
        pub struct Inner {
            longitude: f64,
            latitude: f64,
        }

        let inner = Inner::deserialize(deserializer)?;
        if !(-90.0..=90.0).contains(&inner.latitude) {
            return Err(Error::custom(format!("invalid latitude: {}, must be between -90 and 90", inner.latitude)));
        }

        if !(-180.0..=180.0).contains(&inner.longitude) {
            return Err(Error::custom(format!("invalid longitude: {}, must be between -180 and 180", inner.longitude)));
        }

        Ok(GeoLocation::new(inner.longitude, inner.latitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_a_valid_location() {
        let location: GeoLocation = serde_json::from_value(json!({ "longitude": 130.2163, "latitude": 33.5946 })).unwrap();
        assert_eq!(location, GeoLocation::new(130.2163, 33.5946));
    }

    #[test]
    fn rejects_an_out_of_range_latitude() {
        let result = serde_json::from_value::<GeoLocation>(json!({ "longitude": 130.0, "latitude": 91.0 }));
        assert!(result.unwrap_err().to_string().contains("invalid latitude: 91"));
    }

    #[test]
    fn rejects_an_out_of_range_longitude() {
        let result = serde_json::from_value::<GeoLocation>(json!({ "longitude": -181.0, "latitude": 33.0 }));
        assert!(result.unwrap_err().to_string().contains("invalid longitude: -181"));
    }
}
