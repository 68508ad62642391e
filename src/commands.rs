//! Vendor commands, grouped by the device module that answers them
use std::{net::SocketAddr, time::Duration};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    datatypes::{
        check_response, GetLightStateResult, LightState, RawSysInfo, SetLightState, SysInfo,
        SysInfoResponse,
    },
    discovery::QUERY,
    error::{Error, Result},
    protocol::{DefaultProtocol, Protocol},
};

pub const LIGHT_SERVICE: &str = "smartlife.iot.smartbulb.lightingservice";
pub const PLUG_SYSTEM: &str = "system";
pub const BULB_SYSTEM: &str = "smartlife.iot.common.system";
pub const PLUG_EMETER: &str = "emeter";
pub const BULB_EMETER: &str = "smartlife.iot.common.emeter";

pub trait DeviceActions {
    /// Send a message to a device and return its parsed response
    fn send<T: DeserializeOwned>(&self, msg: &str) -> Result<T>;

    /// Send a command whose answer only carries error codes
    fn command(&self, command: Value) -> Result<Value> {
        let response: Value = self.send(&command.to_string())?;
        check_response(&response)?;
        Ok(response)
    }

    fn raw_sysinfo(&self) -> Result<RawSysInfo> {
        self.send::<SysInfoResponse>(QUERY)?.into_raw()
    }

    fn sysinfo(&self) -> Result<SysInfo> {
        SysInfo::from_raw(&self.raw_sysinfo()?)
    }

    /// Restart the device after `delay`, whole seconds only. Plugs answer on
    /// `system`, bulbs on `smartlife.iot.common.system`.
    fn reboot_with_delay(&self, module: &str, delay: Duration) -> Result<()> {
        self.command(json!({ module: {"reboot": {"delay": delay.as_secs()}} }))?;
        Ok(())
    }
}

/// Relay control, as found on plugs and switches
pub trait Switch: DeviceActions {
    fn is_on(&self) -> Result<bool> {
        if let Some(relay_state) = self.sysinfo()?.relay_state {
            Ok(relay_state > 0)
        } else {
            Err(Error::Other(String::from("No relay state")))
        }
    }

    fn switch_on(&self) -> Result<()> {
        self.command(json!({"system": {"set_relay_state": {"state": 1}}}))?;
        Ok(())
    }

    fn switch_off(&self) -> Result<()> {
        self.command(json!({"system": {"set_relay_state": {"state": 0}}}))?;
        Ok(())
    }
}

pub trait Light: DeviceActions {
    fn get_light_state(&self) -> Result<LightState> {
        let command = json!({
            LIGHT_SERVICE: {
                "get_light_state": null
            }
        })
        .to_string();
        self.send::<GetLightStateResult>(&command)?.light_state()
    }

    fn set_light_state(&self, light_state: SetLightState) -> Result<LightState> {
        let command = json!({
            LIGHT_SERVICE: {
                "transition_light_state": light_state,
            },
        })
        .to_string();
        self.send::<GetLightStateResult>(&command)?.light_state()
    }

    fn is_light_on(&self) -> Result<bool> {
        Ok(self.get_light_state()?.is_on())
    }

    fn light_on(&self) -> Result<()> {
        self.set_light_state(SetLightState {
            on_off: Some(1),
            ..Default::default()
        })?;
        Ok(())
    }

    fn light_off(&self) -> Result<()> {
        self.set_light_state(SetLightState {
            on_off: Some(0),
            ..Default::default()
        })?;
        Ok(())
    }
}

pub trait Dimmer: Light {
    fn brightness(&self) -> Result<u16> {
        Ok(self.get_light_state()?.settings().brightness)
    }

    fn set_brightness(&self, brightness: u16) -> Result<()> {
        if brightness > 100 {
            return Err(Error::InvalidArguments(String::from(
                "Invalid brightness; must be between 0 and 100",
            )));
        }
        self.set_light_state(SetLightState {
            brightness: Some(brightness),
            ..Default::default()
        })?;
        Ok(())
    }
}

pub trait Colour: Light {
    fn get_hsv(&self) -> Result<(u16, u16, u16)> {
        let settings = self.get_light_state()?.settings();

        Ok((settings.hue, settings.saturation, settings.brightness))
    }

    fn set_hsv(&self, hue: u16, saturation: u16, brightness: u16) -> Result<()> {
        if hue > 360 {
            return Err(Error::InvalidColorSpec(String::from(
                "Invalid hue; must be between 0 and 360",
            )));
        }
        if saturation > 100 {
            return Err(Error::InvalidColorSpec(String::from(
                "Invalid saturation; must be between 0 and 100",
            )));
        }
        if brightness > 100 {
            return Err(Error::InvalidColorSpec(String::from(
                "Invalid brightness; must be between 0 and 100",
            )));
        }
        // color_temp 0 takes the bulb out of white mode
        self.set_light_state(SetLightState {
            hue: Some(hue),
            saturation: Some(saturation),
            brightness: Some(brightness),
            color_temp: Some(0),
            ..Default::default()
        })?;
        Ok(())
    }
}

pub trait ColourTemp: Light {
    fn color_temp(&self) -> Result<u16> {
        Ok(self.get_light_state()?.settings().color_temp)
    }

    fn set_color_temp(&self, kelvin: u16) -> Result<()> {
        self.set_light_state(SetLightState {
            color_temp: Some(kelvin),
            ..Default::default()
        })?;
        Ok(())
    }
}

/// Energy meter readings. Plugs answer on `emeter`, bulbs on
/// `smartlife.iot.common.emeter`.
pub trait Emeter: DeviceActions {
    fn emeter_query(&self, module: &str, method: &str, args: Value) -> Result<Value> {
        let response = self.command(json!({ module: { method: args } }))?;
        response
            .get(module)
            .and_then(|m| m.get(method))
            .cloned()
            .ok_or_else(|| Error::Other(format!("No {} in {} response", method, module)))
    }

    fn get_emeter_realtime(&self, module: &str) -> Result<Value> {
        self.emeter_query(module, "get_realtime", Value::Null)
    }

    fn get_emeter_daily(&self, module: &str, year: i32, month: u32) -> Result<Value> {
        self.emeter_query(module, "get_daystat", json!({"month": month, "year": year}))
    }

    fn get_emeter_monthly(&self, module: &str, year: i32) -> Result<Value> {
        self.emeter_query(module, "get_monthstat", json!({ "year": year }))
    }
}

/// The handle a device adapter holds: one address and its transport.
pub struct Connection {
    addr: SocketAddr,
    protocol: Box<dyn Protocol>,
}

impl Connection {
    pub fn new(addr: SocketAddr) -> Self {
        Self::with_protocol(addr, Box::new(DefaultProtocol::new()))
    }

    pub fn with_protocol(addr: SocketAddr, protocol: Box<dyn Protocol>) -> Self {
        Self { addr, protocol }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl DeviceActions for Connection {
    fn send<T: DeserializeOwned>(&self, msg: &str) -> Result<T> {
        Ok(serde_json::from_str::<T>(
            &self.protocol.send(self.addr, msg)?,
        )?)
    }
}

impl Switch for Connection {}
impl Light for Connection {}
impl Dimmer for Connection {}
impl Colour for Connection {}
impl ColourTemp for Connection {}
impl Emeter for Connection {}
