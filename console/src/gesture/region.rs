//! Region-under-cursor lookup: maps the globe's yaw to the named region
//! currently facing the viewer.  Display only; nothing in the control path
//! reads it.

use std::f32::consts::TAU;

/// Longitude band facing the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// [0°, 60°) and [330°, 360°]
    AfricaEurope,
    /// [60°, 160°)
    AsiaOceania,
    /// [160°, 250°)
    Pacific,
    /// [250°, 330°)
    Americas,
    /// Anything that falls through the bands (non-finite yaw).
    Ocean,
}

impl Region {
    /// String representation for HUD and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfricaEurope => "africa-europe",
            Self::AsiaOceania => "asia-oceania",
            Self::Pacific => "pacific",
            Self::Americas => "americas",
            Self::Ocean => "ocean",
        }
    }

    /// Human-readable HUD label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AfricaEurope => "Africa / Europe",
            Self::AsiaOceania => "Asia / Oceania",
            Self::Pacific => "Pacific",
            Self::Americas => "Americas",
            Self::Ocean => "Open ocean",
        }
    }

    /// Region for a yaw in degrees, already normalized to [0, 360].
    pub fn from_degrees(deg: f32) -> Self {
        if (0.0..60.0).contains(&deg) || (330.0..=360.0).contains(&deg) {
            Self::AfricaEurope
        } else if (60.0..160.0).contains(&deg) {
            Self::AsiaOceania
        } else if (160.0..250.0).contains(&deg) {
            Self::Pacific
        } else if (250.0..330.0).contains(&deg) {
            Self::Americas
        } else {
            Self::Ocean
        }
    }

    /// Region for an arbitrary yaw in radians.
    pub fn from_yaw(yaw_rad: f32) -> Self {
        Self::from_degrees(normalize_degrees(yaw_rad))
    }
}

/// Yaw in radians wrapped into [0, 360) degrees.
pub fn normalize_degrees(yaw_rad: f32) -> f32 {
    let mut wrapped = yaw_rad % TAU;
    if wrapped < 0.0 {
        wrapped += TAU;
    }
    wrapped.to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Region::from_degrees(0.0), Region::AfricaEurope);
        assert_eq!(Region::from_degrees(59.999), Region::AfricaEurope);
        assert_eq!(Region::from_degrees(60.0), Region::AsiaOceania);
        assert_eq!(Region::from_degrees(159.999), Region::AsiaOceania);
        assert_eq!(Region::from_degrees(160.0), Region::Pacific);
        assert_eq!(Region::from_degrees(249.999), Region::Pacific);
        assert_eq!(Region::from_degrees(250.0), Region::Americas);
        assert_eq!(Region::from_degrees(329.999), Region::Americas);
        assert_eq!(Region::from_degrees(330.0), Region::AfricaEurope);
        assert_eq!(Region::from_degrees(360.0), Region::AfricaEurope);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(Region::from_degrees(f32::NAN), Region::Ocean);
        assert_eq!(Region::from_yaw(f32::INFINITY), Region::Ocean);
    }

    #[test]
    fn test_sweep_is_total() {
        // Every whole degree of a full turn lands in one of the four bands.
        for d in 0..360 {
            let region = Region::from_degrees(d as f32);
            assert_ne!(region, Region::Ocean, "{} degrees fell through", d);
        }
    }

    #[test]
    fn test_from_yaw_wraps() {
        assert_eq!(Region::from_yaw(0.0), Region::AfricaEurope);
        assert_eq!(Region::from_yaw(100f32.to_radians()), Region::AsiaOceania);
        assert_eq!(Region::from_yaw(-(90f32.to_radians())), Region::Americas);
        assert_eq!(Region::from_yaw(TAU + 200f32.to_radians()), Region::Pacific);
        // Yaw held during the elimination sequence.
        assert_eq!(Region::from_yaw(-4.0), Region::AsiaOceania);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(std::f32::consts::PI) - 180.0).abs() < 1e-3);
        assert!((normalize_degrees(-std::f32::consts::FRAC_PI_2) - 270.0).abs() < 1e-3);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Region::AfricaEurope.as_str(), "africa-europe");
        assert_eq!(Region::Ocean.as_str(), "ocean");
    }
}
