use crate::error::GuestError;
use rsvp_derive::api_model;
use rsvp_domain::guest::{GuestSubmission, TransportMode};
use std::ops::RangeInclusive;

const FULL_NAME_CHARS: RangeInclusive<usize> = 2..=100;
const PHONE_CHARS: RangeInclusive<usize> = 5..=20;
const PLATE_CHARS: RangeInclusive<usize> = 2..=20;

#[api_model(deny_unknown_fields = false)]
/// Guest reply submitted by the invitation page
pub struct ContactRequest {
    /// Full name
    #[schema(example = "Ivan Petrov")]
    pub fio: String,
    /// Contact phone number
    #[schema(example = "+7 900 123-45-67")]
    pub telephone: String,
    /// `transfer` or `car`
    #[schema(example = "car")]
    pub transport: String,
    /// License plate, only read when `transport` is `car`
    #[serde(default)]
    #[schema(example = "A123BC")]
    pub car_number: Option<String>,
}

#[api_model]
/// Submission accepted
pub struct ContactResponse {
    /// Always `success`
    pub status: String,
    pub message: String,
}

impl ContactResponse {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: "success".to_owned(),
            message: "Your reply was received and forwarded to the organizers".to_owned(),
        }
    }
}

impl ContactRequest {
    /// Checks field bounds and converts into the core submission type.
    ///
    /// # Errors
    /// Returns [`GuestError::Validation`] naming the first offending field.
    pub fn validate(self) -> Result<GuestSubmission, GuestError> {
        let full_name = bounded("fio", &self.fio, &FULL_NAME_CHARS)?;
        let phone = bounded("telephone", &self.telephone, &PHONE_CHARS)?;
        let transport_mode = match self.transport.trim() {
            "transfer" => TransportMode::Transfer,
            "car" => TransportMode::Car,
            _ => return Err(invalid("transport must be one of: transfer, car")),
        };

        let car_plate = match self.car_number.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(plate) => Some(bounded("car_number", plate, &PLATE_CHARS)?),
        };

        Ok(GuestSubmission { full_name, phone, transport_mode, car_plate })
    }
}

fn bounded(field: &str, value: &str, chars: &RangeInclusive<usize>) -> Result<String, GuestError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    if !chars.contains(&value.chars().count()) {
        return Err(invalid(format!(
            "{field} must be between {} and {} characters",
            chars.start(),
            chars.end()
        )));
    }
    Ok(value.to_owned())
}

fn invalid(message: impl Into<String>) -> GuestError {
    GuestError::Validation { message: message.into().into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(fio: &str, phone: &str, transport: &str, car: Option<&str>) -> ContactRequest {
        ContactRequest {
            fio: fio.to_owned(),
            telephone: phone.to_owned(),
            transport: transport.to_owned(),
            car_number: car.map(str::to_owned),
        }
    }

    #[test]
    fn valid_car_request_keeps_the_plate() {
        let submission = request(" Ivan Petrov ", "+79001234567", "car", Some(" A123BC ")).validate().unwrap();
        assert_eq!(submission.full_name, "Ivan Petrov");
        assert_eq!(submission.transport_mode, TransportMode::Car);
        assert_eq!(submission.car_plate.as_deref(), Some("A123BC"));
    }

    #[test]
    fn blank_plate_is_treated_as_absent() {
        let submission = request("Ivan", "12345", "transfer", Some("  ")).validate().unwrap();
        assert_eq!(submission.car_plate, None);
    }

    #[test]
    fn lengths_are_counted_in_characters() {
        assert!(request("Яш", "12345", "transfer", None).validate().is_ok());
        let long = "Я".repeat(101);
        assert!(request(&long, "12345", "transfer", None).validate().is_err());
    }

    #[test]
    fn out_of_bounds_fields_are_rejected() {
        for bad in [
            request("", "12345", "car", None),
            request("I", "12345", "car", None),
            request("Ivan", "1234", "car", None),
            request("Ivan", "123456789012345678901", "car", None),
            request("Ivan", "12345", "bus", None),
            request("Ivan", "12345", "car", Some("A")),
        ] {
            assert!(matches!(bad.validate(), Err(GuestError::Validation { .. })));
        }
    }

    #[test]
    fn error_names_the_field() {
        let err = request("Ivan", "", "car", None).validate().unwrap_err();
        assert!(err.to_string().contains("telephone is required"));
    }
}
