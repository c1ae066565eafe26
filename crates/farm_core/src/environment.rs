//! Environmental data model.
//!
//! Readings evolve one step per call: seasonal fields drift toward the
//! location's target for the current season, the rest random-walk around
//! their previous value. Every field is clamped to its declared range after
//! every step, so no reading can leave its bounds no matter what the
//! location config or season targets contain.

use rand::Rng;

use crate::{EnvField, EnvironmentalReading, SeasonTarget};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamps into range. NaN collapses to the lower bound.
    pub fn clamp(self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    pub fn contains(self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const SOIL_MOISTURE: Bounds = Bounds::new(10.0, 95.0);
pub const TEMPERATURE: Bounds = Bounds::new(-10.0, 45.0);
pub const PRECIPITATION: Bounds = Bounds::new(0.0, 40.0);
pub const SOLAR_IRRADIANCE: Bounds = Bounds::new(100.0, 1000.0);
pub const WIND_SPEED: Bounds = Bounds::new(0.0, 50.0);
pub const NDVI: Bounds = Bounds::new(0.1, 0.9);
pub const RELATIVE_HUMIDITY: Bounds = Bounds::new(20.0, 99.0);

/// Precipitation above this is rain.
pub const RAIN_THRESHOLD: f32 = 15.0;
/// Solar irradiance above this is a sunny tick.
pub const SUNNY_THRESHOLD: f32 = 800.0;

const TEMPERATURE_APPROACH: f32 = 0.1;
const TEMPERATURE_NOISE: f32 = 2.0;
const SOIL_MOISTURE_SPREAD: f32 = 8.0;
const PRECIPITATION_SPREAD: f32 = 5.0;
const SOLAR_SPREAD: f32 = 100.0;
const WIND_SPREAD: f32 = 5.0;
const NDVI_SPREAD: f32 = 0.05;
const HUMIDITY_SPREAD: f32 = 10.0;

impl EnvironmentalReading {
    /// Every field clamped into its declared range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            soil_moisture: SOIL_MOISTURE.clamp(self.soil_moisture),
            temperature: TEMPERATURE.clamp(self.temperature),
            precipitation: PRECIPITATION.clamp(self.precipitation),
            solar_irradiance: SOLAR_IRRADIANCE.clamp(self.solar_irradiance),
            wind_speed: WIND_SPEED.clamp(self.wind_speed),
            ndvi: NDVI.clamp(self.ndvi),
            relative_humidity: RELATIVE_HUMIDITY.clamp(self.relative_humidity),
        }
    }

    pub fn within_bounds(&self) -> bool {
        SOIL_MOISTURE.contains(self.soil_moisture)
            && TEMPERATURE.contains(self.temperature)
            && PRECIPITATION.contains(self.precipitation)
            && SOLAR_IRRADIANCE.contains(self.solar_irradiance)
            && WIND_SPEED.contains(self.wind_speed)
            && NDVI.contains(self.ndvi)
            && RELATIVE_HUMIDITY.contains(self.relative_humidity)
    }

    pub fn is_raining(&self) -> bool {
        self.precipitation > RAIN_THRESHOLD
    }

    pub fn is_sunny(&self) -> bool {
        self.solar_irradiance > SUNNY_THRESHOLD
    }

    pub fn field(&self, field: EnvField) -> f32 {
        match field {
            EnvField::SoilMoisture => self.soil_moisture,
            EnvField::Ndvi => self.ndvi,
        }
    }
}

/// `value + uniform(-spread/2, +spread/2)`
fn vary(value: f32, spread: f32, rng: &mut impl Rng) -> f32 {
    value + (rng.gen::<f32>() - 0.5) * spread
}

/// One evolution step toward `target`.
///
/// Temperature approaches the target exponentially with a little noise.
/// Precipitation, solar irradiance and humidity scatter around the seasonal
/// target; soil moisture, wind speed and NDVI random-walk from their previous
/// value. The input is clamped first, so an out-of-range starting reading
/// is pulled back into range on the first step.
pub fn advance(
    reading: &EnvironmentalReading,
    target: &SeasonTarget,
    rng: &mut impl Rng,
) -> EnvironmentalReading {
    let current = reading.clamped();
    let approach = (target.temperature - current.temperature) * TEMPERATURE_APPROACH;
    let temperature = vary(current.temperature + approach, TEMPERATURE_NOISE, rng);

    EnvironmentalReading {
        soil_moisture: vary(current.soil_moisture, SOIL_MOISTURE_SPREAD, rng),
        temperature,
        precipitation: vary(target.precipitation, PRECIPITATION_SPREAD, rng),
        solar_irradiance: vary(target.solar_irradiance, SOLAR_SPREAD, rng),
        wind_speed: vary(current.wind_speed, WIND_SPREAD, rng),
        ndvi: vary(current.ndvi, NDVI_SPREAD, rng),
        relative_humidity: vary(target.relative_humidity, HUMIDITY_SPREAD, rng),
    }
    .clamped()
}
