//! What each kind of device can do
use std::fmt;

use crate::{
    datatypes::SysInfo,
    error::{Error, Result},
};

/// The kind of device an adapter was built as. Decided once from sysinfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Generic,
    Plug,
    Bulb,
    RgbBulb,
    RgbwBulb,
}

impl Variant {
    pub fn classify(sysinfo: &SysInfo) -> Variant {
        if sysinfo.is_bulb() {
            if sysinfo.is_color.unwrap_or(0) > 0 {
                Variant::RgbwBulb
            } else {
                Variant::Bulb
            }
        } else if sysinfo.is_plug() {
            Variant::Plug
        } else {
            Variant::Generic
        }
    }

    pub fn is_bulb(self) -> bool {
        matches!(self, Variant::Bulb | Variant::RgbBulb | Variant::RgbwBulb)
    }

    pub fn device_type(self) -> &'static str {
        match self {
            Variant::Generic => "generic tplink kasa device",
            Variant::Plug => "smart plug",
            Variant::Bulb => "light bulb",
            Variant::RgbBulb => "rgb light bulb",
            Variant::RgbwBulb => "rgbw light bulb",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Variant::Generic => "generic kasa device",
            other => other.device_type(),
        }
    }

    fn ceiling(self) -> Capabilities {
        let light = self.is_bulb();
        Capabilities {
            on_off: true,
            dimmable: light,
            color: matches!(self, Variant::RgbBulb | Variant::RgbwBulb),
            variable_color_temp: light,
            emeter: self != Variant::Generic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Dimming,
    Color,
    ColorTemperature,
    EnergyMeter,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Capability::Dimming => "dimming",
            Capability::Color => "color",
            Capability::ColorTemperature => "color temperature",
            Capability::EnergyMeter => "energy metering",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub on_off: bool,
    pub dimmable: bool,
    pub color: bool,
    pub variable_color_temp: bool,
    pub emeter: bool,
}

impl Capabilities {
    /// The variant's ceiling narrowed by the flags the device reports.
    pub fn resolve(variant: Variant, sysinfo: &SysInfo) -> Capabilities {
        let ceiling = variant.ceiling();
        let reported = |flag: Option<u8>, default: bool| flag.map(|f| f > 0).unwrap_or(default);

        Capabilities {
            on_off: ceiling.on_off,
            dimmable: ceiling.dimmable && reported(sysinfo.is_dimmable, true),
            color: ceiling.color && reported(sysinfo.is_color, true),
            variable_color_temp: ceiling.variable_color_temp
                && reported(sysinfo.is_variable_color_temp, false),
            emeter: ceiling.emeter && (variant.is_bulb() || sysinfo.has_feature("ENE")),
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Dimming => self.dimmable,
            Capability::Color => self.color,
            Capability::ColorTemperature => self.variable_color_temp,
            Capability::EnergyMeter => self.emeter,
        }
    }

    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(Error::UnsupportedCapability(capability))
        }
    }
}

/// Supported color temperatures in kelvin, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTempRange {
    pub min: u16,
    pub max: u16,
}

impl ColorTempRange {
    pub fn for_model(model: &str) -> ColorTempRange {
        let (min, max) = if ["LB130", "LB230", "KB130", "KL130"]
            .iter()
            .any(|m| model.starts_with(m))
        {
            (2500, 9000)
        } else if model.starts_with("KL120(US)") {
            (2700, 5000)
        } else {
            (2700, 6500)
        };
        ColorTempRange { min, max }
    }

    pub fn clamp(&self, kelvin: i32) -> u16 {
        kelvin.max(i32::from(self.min)).min(i32::from(self.max)) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HS100_SYSINFO, HS110_SYSINFO, LB110_SYSINFO_OFF, LB130_SYSINFO};

    fn sysinfo(json: &str) -> SysInfo {
        SysInfo::from_raw(&serde_json::from_str(json).unwrap()).unwrap()
    }

    #[test]
    fn classify_devices() {
        assert_eq!(Variant::Plug, Variant::classify(&sysinfo(HS100_SYSINFO)));
        assert_eq!(Variant::Bulb, Variant::classify(&sysinfo(LB110_SYSINFO_OFF)));
        assert_eq!(Variant::RgbwBulb, Variant::classify(&sysinfo(LB130_SYSINFO)));
        assert_eq!(
            Variant::Generic,
            Variant::classify(&sysinfo(r#"{"alias":"Hub","type":"IOT.RANGEEXTENDER"}"#))
        );
    }

    #[test]
    fn plugs_only_switch() {
        let caps = Capabilities::resolve(Variant::Plug, &sysinfo(HS100_SYSINFO));

        assert!(caps.on_off);
        assert!(!caps.dimmable);
        assert!(!caps.color);
        assert!(!caps.variable_color_temp);
        assert!(!caps.emeter);
    }

    #[test]
    fn energy_plug_has_emeter() {
        let caps = Capabilities::resolve(Variant::Plug, &sysinfo(HS110_SYSINFO));

        assert!(caps.emeter);
        assert!(caps.require(Capability::EnergyMeter).is_ok());
    }

    #[test]
    fn bulb_flags_come_from_sysinfo() {
        let caps = Capabilities::resolve(Variant::Bulb, &sysinfo(LB110_SYSINFO_OFF));
        assert!(caps.dimmable);
        assert!(!caps.color);
        assert!(!caps.variable_color_temp);

        let caps = Capabilities::resolve(Variant::RgbwBulb, &sysinfo(LB130_SYSINFO));
        assert!(caps.dimmable);
        assert!(caps.color);
        assert!(caps.variable_color_temp);
    }

    #[test]
    fn plain_bulb_never_gains_color() {
        let caps = Capabilities::resolve(Variant::Bulb, &sysinfo(LB130_SYSINFO));

        assert!(!caps.color);
        assert!(matches!(
            caps.require(Capability::Color),
            Err(Error::UnsupportedCapability(Capability::Color))
        ));
    }

    #[test]
    fn color_temp_ranges() {
        assert_eq!(
            ColorTempRange { min: 2500, max: 9000 },
            ColorTempRange::for_model("LB130(EU)")
        );
        assert_eq!(
            ColorTempRange { min: 2700, max: 5000 },
            ColorTempRange::for_model("KL120(US)")
        );
        assert_eq!(
            ColorTempRange { min: 2700, max: 6500 },
            ColorTempRange::for_model("KL120(EU)")
        );

        let range = ColorTempRange::for_model("LB120(EU)");
        assert_eq!(2700, range.clamp(100));
        assert_eq!(6500, range.clamp(12000));
        assert_eq!(4000, range.clamp(4000));
    }
}
