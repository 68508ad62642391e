use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;

use crate::{
    capabilities::{Capabilities, Capability, ColorTempRange, Variant},
    color::{standard_to_vendor, Color, ColorSummary},
    commands::{
        Colour, ColourTemp, Connection, DeviceActions, Dimmer, Emeter, Light, Switch, BULB_EMETER,
        BULB_SYSTEM, PLUG_EMETER, PLUG_SYSTEM,
    },
    datatypes::{LightState, RawSysInfo, SysInfo},
    error::Result,
};

/// One Kasa plug or bulb behind a uniform interface.
///
/// The variant and capability flags are fixed when the device is built.
/// Everything else is read from the device when asked for.
pub struct Device {
    conn: Connection,
    variant: Variant,
    capabilities: Capabilities,
    temp_range: ColorTempRange,
    device_id: String,
    sysinfo: SysInfo,
    raw: RawSysInfo,
    last_seen: DateTime<Utc>,
}

impl Device {
    /// Fetch sysinfo over the default transport and build the matching device
    pub fn connect(addr: SocketAddr) -> Result<Device> {
        Device::connect_with(Connection::new(addr))
    }

    pub fn connect_with(conn: Connection) -> Result<Device> {
        let raw = conn.raw_sysinfo()?;
        Device::from_sysinfo(conn, raw)
    }

    pub fn from_sysinfo(conn: Connection, raw: RawSysInfo) -> Result<Device> {
        let sysinfo = SysInfo::from_raw(&raw)?;
        let variant = Variant::classify(&sysinfo);
        Ok(Device::build(conn, variant, sysinfo, raw))
    }

    /// Build a device as a specific variant, whatever the sysinfo says
    pub fn with_variant(conn: Connection, variant: Variant, raw: RawSysInfo) -> Result<Device> {
        let sysinfo = SysInfo::from_raw(&raw)?;
        Ok(Device::build(conn, variant, sysinfo, raw))
    }

    fn build(conn: Connection, variant: Variant, sysinfo: SysInfo, raw: RawSysInfo) -> Device {
        let capabilities = Capabilities::resolve(variant, &sysinfo);
        let temp_range = ColorTempRange::for_model(&sysinfo.model);
        let device_id = match &sysinfo.device_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ if !sysinfo.alias.is_empty() => format!("{}:{}", sysinfo.alias, conn.addr().ip()),
            _ => format!("{}:{}", variant.default_name(), conn.addr().ip()),
        };

        Device {
            conn,
            variant,
            capabilities,
            temp_range,
            device_id,
            sysinfo,
            raw,
            last_seen: Utc::now(),
        }
    }

    pub fn host(&self) -> IpAddr {
        self.conn.addr().ip()
    }

    pub fn addr(&self) -> SocketAddr {
        self.conn.addr()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn name(&self) -> &str {
        if self.sysinfo.alias.is_empty() {
            self.variant.default_name()
        } else {
            &self.sysinfo.alias
        }
    }

    pub fn model(&self) -> &str {
        if self.sysinfo.model.is_empty() {
            "kasa"
        } else {
            &self.sysinfo.model
        }
    }

    pub fn device_type(&self) -> &'static str {
        self.variant.device_type()
    }

    pub fn raw_data(&self) -> &RawSysInfo {
        &self.raw
    }

    pub fn sysinfo(&self) -> &SysInfo {
        &self.sysinfo
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    pub fn is_dimmable(&self) -> bool {
        self.capabilities.dimmable
    }

    pub fn is_color(&self) -> bool {
        self.capabilities.color
    }

    pub fn is_variable_color_temp(&self) -> bool {
        self.capabilities.variable_color_temp
    }

    pub fn color_temp_range(&self) -> Option<ColorTempRange> {
        if self.capabilities.variable_color_temp {
            Some(self.temp_range)
        } else {
            None
        }
    }

    /// Re-read sysinfo. Variant and capabilities stay as they were built.
    pub fn refresh(&mut self) -> Result<()> {
        let raw = self.conn.raw_sysinfo()?;
        self.sysinfo = SysInfo::from_raw(&raw)?;
        self.raw = raw;
        Ok(())
    }

    pub fn is_on(&self) -> Result<bool> {
        if self.variant.is_bulb() {
            self.conn.is_light_on()
        } else {
            Switch::is_on(&self.conn)
        }
    }

    pub fn is_off(&self) -> Result<bool> {
        Ok(!self.is_on()?)
    }

    pub fn turn_on(&self) -> Result<()> {
        if self.variant.is_bulb() {
            self.conn.light_on()
        } else {
            self.conn.switch_on()
        }
    }

    pub fn turn_off(&self) -> Result<()> {
        if self.variant.is_bulb() {
            self.conn.light_off()
        } else {
            self.conn.switch_off()
        }
    }

    /// Returns the new state
    pub fn toggle(&self) -> Result<bool> {
        if self.is_on()? {
            self.turn_off()?;
            Ok(false)
        } else {
            self.turn_on()?;
            Ok(true)
        }
    }

    /// Restart the device once `delay` has passed. The device drops off the
    /// network until it has booted again.
    pub fn reboot(&self, delay: Duration) -> Result<()> {
        let module = if self.variant.is_bulb() {
            BULB_SYSTEM
        } else {
            PLUG_SYSTEM
        };
        self.conn.reboot_with_delay(module, delay)
    }

    /// Brightness in percent, clamped to `[0, 100]`. Ignored by devices that
    /// cannot dim.
    pub fn set_brightness(&self, percent: i32) -> Result<()> {
        if !self.capabilities.dimmable {
            debug!("{} cannot dim, ignoring brightness {}", self.addr(), percent);
            return Ok(());
        }
        self.conn.set_brightness(percent.max(0).min(100) as u16)
    }

    /// Brightness in percent
    pub fn brightness(&self) -> Result<u16> {
        self.capabilities.require(Capability::Dimming)?;
        Dimmer::brightness(&self.conn)
    }

    pub fn brightness_255(&self) -> Result<u8> {
        Ok(percent_to_255(self.brightness()?))
    }

    /// Color temperature in kelvin, clamped to what the model supports.
    /// Ignored by devices without tunable white.
    pub fn set_color_temperature(&self, kelvin: i32) -> Result<()> {
        if !self.capabilities.variable_color_temp {
            debug!(
                "{} has no tunable white, ignoring color temperature {}",
                self.addr(),
                kelvin
            );
            return Ok(());
        }
        self.conn.set_color_temp(self.temp_range.clamp(kelvin))
    }

    pub fn color_temperature(&self) -> Result<u16> {
        self.capabilities.require(Capability::ColorTemperature)?;
        self.conn.color_temp()
    }

    /// Black switches the device off. Any other color switches it on and,
    /// when the device supports color, applies it.
    pub fn set_color(&self, color: &Color) -> Result<()> {
        if color.is_black() {
            return self.turn_off();
        }
        if self.is_off()? {
            self.turn_on()?;
        }
        if self.capabilities.color {
            let (h, s, v) = color.hsv();
            let (hue, saturation, value) = standard_to_vendor(h, s, v);
            self.conn.set_hsv(hue, saturation, value)?;
        } else {
            debug!("{} has no color, only switching it on", self.addr());
        }
        Ok(())
    }

    pub fn set_color_name(&self, name: &str) -> Result<()> {
        self.set_color(&Color::from_name(name)?)
    }

    pub fn set_color_hex(&self, hex: &str) -> Result<()> {
        self.set_color(&Color::from_hex(hex)?)
    }

    /// Black while off, the live color on color devices, white otherwise
    pub fn color(&self) -> Result<Color> {
        if self.variant.is_bulb() {
            Ok(self.color_of(&self.conn.get_light_state()?))
        } else if Switch::is_on(&self.conn)? {
            Ok(Color::WHITE)
        } else {
            Ok(Color::BLACK)
        }
    }

    fn color_of(&self, state: &LightState) -> Color {
        if !state.is_on() {
            Color::BLACK
        } else if self.capabilities.color {
            let settings = state.settings();
            Color::from_vendor_hsv(settings.hue, settings.saturation, settings.brightness)
        } else {
            Color::WHITE
        }
    }

    /// Native hue, saturation and brightness
    pub fn hsv(&self) -> Result<(u16, u16, u16)> {
        self.capabilities.require(Capability::Color)?;
        self.conn.get_hsv()
    }

    pub fn current_consumption(&self) -> Result<Value> {
        self.capabilities.require(Capability::EnergyMeter)?;
        self.conn.get_emeter_realtime(self.emeter_module())
    }

    /// Daily totals for a month, defaulting to the current one
    pub fn daily_consumption(&self, year: Option<i32>, month: Option<u32>) -> Result<Value> {
        self.capabilities.require(Capability::EnergyMeter)?;
        let now = Utc::now();
        self.conn.get_emeter_daily(
            self.emeter_module(),
            year.unwrap_or_else(|| now.year()),
            month.unwrap_or_else(|| now.month()),
        )
    }

    /// Monthly totals for a year, defaulting to the current one
    pub fn monthly_consumption(&self, year: Option<i32>) -> Result<Value> {
        self.capabilities.require(Capability::EnergyMeter)?;
        self.conn
            .get_emeter_monthly(self.emeter_module(), year.unwrap_or_else(|| Utc::now().year()))
    }

    fn emeter_module(&self) -> &'static str {
        if self.variant.is_bulb() {
            BULB_EMETER
        } else {
            PLUG_EMETER
        }
    }

    /// Current state in one read. Light fields are only filled in for bulbs.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let (state, light) = if self.variant.is_bulb() {
            let light_state = self.conn.get_light_state()?;
            let light = LightSnapshot {
                color: self.color_of(&light_state).summary(),
                is_color: self.capabilities.color,
                is_dimmable: self.capabilities.dimmable,
                is_variable_color_temp: self.capabilities.variable_color_temp,
                brightness: percent_to_255(light_state.settings().brightness),
            };
            (light_state.is_on(), Some(light))
        } else {
            (Switch::is_on(&self.conn)?, None)
        };

        Ok(Snapshot {
            host: self.host(),
            name: self.name().to_string(),
            model: self.model().to_string(),
            device_type: self.device_type(),
            device_id: self.device_id.clone(),
            light,
            state,
            raw: self.raw.clone(),
            last_seen: self.last_seen,
        })
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Device")
            .field("addr", &self.addr())
            .field("variant", &self.variant)
            .field("device_id", &self.device_id)
            .field("capabilities", &self.capabilities)
            .field("last_seen", &self.last_seen)
            .finish()
    }
}

fn percent_to_255(percent: u16) -> u8 {
    (f32::from(percent.min(100)) / 100.0 * 255.0).round() as u8
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub host: IpAddr,
    pub name: String,
    pub model: String,
    pub device_type: &'static str,
    pub device_id: String,
    #[serde(flatten)]
    pub light: Option<LightSnapshot>,
    pub state: bool,
    pub raw: RawSysInfo,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LightSnapshot {
    pub color: ColorSummary,
    pub is_color: bool,
    pub is_dimmable: bool,
    pub is_variable_color_temp: bool,
    /// `[0, 255]`
    pub brightness: u8,
}
