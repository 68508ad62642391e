use std::result;

use serde::{
    de::{self, DeserializeOwned},
    Deserialize, Deserializer,
};
use serde_json::{Map, Value};

use crate::error::{Error, Result, SectionError};

type ErrCode = i16;

/// Raw sysinfo object exactly as reported by a device
pub type RawSysInfo = Map<String, Value>;

/// A module or method result, or the error object a device sends in its place.
///
/// Only a non-zero `err_code` makes a section an error; successful sections
/// carry `err_code: 0` alongside their payload.
#[derive(Debug, Clone)]
pub enum SectionResult<T> {
    Ok(T),
    Err(SectionError),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for SectionResult<T> {
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let section = Value::deserialize(deserializer)?;
        match section_error(&section) {
            Some(err) => Ok(SectionResult::Err(err)),
            None => serde_json::from_value(section)
                .map(SectionResult::Ok)
                .map_err(de::Error::custom),
        }
    }
}

impl<T> SectionResult<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Ok(section) => Ok(section),
            Self::Err(err) => Err(Error::from(err)),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SysInfoResponse {
    pub system: SectionResult<System>,
}

impl SysInfoResponse {
    pub fn into_raw(self) -> Result<RawSysInfo> {
        self.system.into_result()?.sysinfo.into_result()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct System {
    #[serde(rename = "get_sysinfo")]
    pub sysinfo: SectionResult<RawSysInfo>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct GetLightStateResult {
    #[serde(rename = "smartlife.iot.smartbulb.lightingservice")]
    pub lightingservice: SectionResult<GetLightState>,
}

impl GetLightStateResult {
    pub fn light_state(self) -> Result<LightState> {
        self.lightingservice.into_result()?.light_state.into_result()
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct GetLightState {
    #[serde(rename = "get_light_state")]
    #[serde(alias = "transition_light_state")]
    pub light_state: SectionResult<LightState>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SysInfo {
    // COMMON
    pub sw_ver: String,
    pub hw_ver: String,
    #[serde(alias = "type")]
    #[serde(alias = "mic_type")]
    pub hw_type: String,
    pub model: String,
    #[serde(alias = "mic_mac")]
    pub mac: String,
    #[serde(rename = "deviceId")]
    pub device_id: Option<String>,
    #[serde(rename = "hwId")]
    pub hw_id: Option<String>,
    #[serde(rename = "oemId")]
    pub oem_id: Option<String>,
    pub alias: String,
    #[serde(alias = "description")]
    pub dev_name: String,
    pub err_code: ErrCode,
    pub rssi: Option<i32>,
    pub active_mode: Option<String>,

    // Plugs
    pub relay_state: Option<u8>,
    pub on_time: Option<i64>,
    pub feature: Option<String>,
    pub led_off: Option<u8>,

    // Bulbs
    pub light_state: Option<LightState>,
    pub is_dimmable: Option<u8>,
    pub is_color: Option<u8>,
    pub is_variable_color_temp: Option<u8>,
}

impl SysInfo {
    pub fn from_raw(raw: &RawSysInfo) -> Result<SysInfo> {
        Ok(serde_json::from_value(Value::Object(raw.clone()))?)
    }

    pub fn is_bulb(&self) -> bool {
        self.hw_type.to_uppercase().contains("SMARTBULB")
            || self.light_state.is_some()
            || self.is_color.is_some()
    }

    pub fn is_plug(&self) -> bool {
        let hw_type = self.hw_type.to_uppercase();
        hw_type.contains("SMARTPLUG") || hw_type.contains("SWITCH") || self.relay_state.is_some()
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.feature
            .as_deref()
            .map(|features| features.split(':').any(|f| f == feature))
            .unwrap_or(false)
    }
}

/// The lighting service state. While the bulb is on the settings sit next to
/// `on_off`; while it is off they move into `dft_on_state`.
#[derive(Debug, Deserialize, Clone)]
pub struct LightState {
    pub on_off: u8,
    pub mode: Option<String>,
    pub hue: Option<u16>,
    pub saturation: Option<u16>,
    pub color_temp: Option<u16>,
    pub brightness: Option<u16>,
    pub dft_on_state: Option<LightSettings>,
    pub err_code: Option<ErrCode>,
}

impl LightState {
    pub fn is_on(&self) -> bool {
        self.on_off > 0
    }

    pub fn settings(&self) -> LightSettings {
        if self.hue.is_some() || self.saturation.is_some() || self.brightness.is_some() {
            LightSettings {
                mode: self.mode.clone(),
                hue: self.hue.unwrap_or(0),
                saturation: self.saturation.unwrap_or(0),
                color_temp: self.color_temp.unwrap_or(0),
                brightness: self.brightness.unwrap_or(0),
            }
        } else {
            self.dft_on_state.clone().unwrap_or_default()
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LightSettings {
    pub mode: Option<String>,
    pub hue: u16,
    pub saturation: u16,
    pub color_temp: u16,
    pub brightness: u16,
}

/// Arguments of `transition_light_state`; unset fields are left out of the
/// request so the bulb keeps their current value.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SetLightState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_off: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_temp: Option<u16>,
}

/// Fail with the first non-zero `err_code` found at module or method level.
pub fn check_response(response: &Value) -> Result<()> {
    for module in response.as_object().into_iter().flat_map(Map::values) {
        check_section(module)?;
        for method in module.as_object().into_iter().flat_map(Map::values) {
            check_section(method)?;
        }
    }
    Ok(())
}

fn check_section(section: &Value) -> Result<()> {
    match section_error(section) {
        Some(err) => Err(Error::from(err)),
        None => Ok(()),
    }
}

fn section_error(section: &Value) -> Option<SectionError> {
    let err_code = section.get("err_code")?.as_i64().filter(|code| *code != 0)?;
    let err_msg = section
        .get("err_msg")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(SectionError {
        err_code: err_code as ErrCode,
        err_msg: err_msg.to_string(),
    })
}
