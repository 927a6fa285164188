use crate::{client::RawResponse, model::Weather};

const IS_DAY: i32 = 1;

/// Convert a raw WeatherAPI payload into the domain entity.
///
/// The feels-like value drops its fraction rather than rounding.
pub fn normalize(raw: RawResponse) -> Weather {
    let RawResponse { location, current } = raw;

    Weather::new(
        location.name,
        location.region,
        location.country,
        current.temp_c,
        format!("Feels like {}°C", current.feelslike_c.trunc() as i64),
        format!("{}%", current.humidity),
        current.condition.text,
        current.condition.code,
        current.is_day == IS_DAY,
    )
}
