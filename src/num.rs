//! Number formatting helpers.

use serde::{Serialize, Serializer};

/// A volume written with exactly three digits after the decimal point, e.g. `107.752` or
/// `1.000`.
///
/// Other serializers see a plain newtype around the `f32`. Non-finite values are written as
/// `null`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Fixed3(pub f32);

impl Fixed3 {
    pub(crate) const NAME: &'static str = "__gateway_json_core_fixed3__";
}

impl Serialize for Fixed3 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(Self::NAME, &self.0)
    }
}

/// `serialize_with` helper writing an `f32` field as [`Fixed3`].
///
/// ```
/// #[derive(serde::Serialize)]
/// struct Reading {
///     #[serde(serialize_with = "gateway_json_core::num::fixed3")]
///     total_m3: f32,
/// }
///
/// let json = gateway_json_core::to_string::<_, 32>(&Reading { total_m3: 2.5 }).unwrap();
/// assert_eq!(json, r#"{"total_m3":2.500}"#);
/// ```
pub fn fixed3<S>(value: &f32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    Fixed3(*value).serialize(serializer)
}
