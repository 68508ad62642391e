//! In-memory devices for tests: a fake network that answers vendor requests
//! the way plugs and bulbs do.
use std::{cell::RefCell, collections::HashMap, io, net::SocketAddr, rc::Rc};

use serde_json::{json, Map, Value};

use crate::{
    commands::{Connection, BULB_EMETER, BULB_SYSTEM, LIGHT_SERVICE, PLUG_EMETER},
    devices::Device,
    discovery::Discover,
    error::{Error, Result},
    protocol::Protocol,
};

pub const HS100_SYSINFO: &str = r#"{
  "sw_ver": "1.5.8 Build 180815 Rel.135935",
  "hw_ver": "2.1",
  "type": "IOT.SMARTPLUGSWITCH",
  "model": "HS100(UK)",
  "mac": "00:00:00:00:00:00",
  "dev_name": "Smart Wi-Fi Plug",
  "alias": "Switch Two",
  "relay_state": 0,
  "on_time": 0,
  "active_mode": "none",
  "feature": "TIM",
  "updating": 0,
  "icon_hash": "",
  "rssi": -53,
  "led_off": 0,
  "longitude_i": 123,
  "latitude_i": 3456,
  "hwId": "00000000000000000000000000000000",
  "fwId": "00000000000000000000000000000000",
  "deviceId": "8006A8B7C3E0A1D7D31E9E0F4E2C1B0A00000001",
  "oemId": "FDD18403D5E8DB3613009C820963E018",
  "next_action": {
    "type": -1
  },
  "ntc_state": 0,
  "err_code": 0
}"#;

pub const HS110_SYSINFO: &str = r#"{
  "err_code": 0,
  "sw_ver": "1.2.5 Build 171213 Rel.095335",
  "hw_ver": "1.0",
  "type": "IOT.SMARTPLUGSWITCH",
  "model": "HS110(UK)",
  "mac": "00:00:00:00:00:00",
  "deviceId": "8006A8B7C3E0A1D7D31E9E0F4E2C1B0A00000002",
  "hwId": "00000000000000000000000000000000",
  "fwId": "00000000000000000000000000000000",
  "oemId": "90AEEA7AECBF1A879FCA3C104C58C4D8",
  "alias": "Switch One",
  "dev_name": "Wi-Fi Smart Plug With Energy Monitoring",
  "icon_hash": "",
  "relay_state": 1,
  "on_time": 12521,
  "active_mode": "schedule",
  "feature": "TIM:ENE",
  "updating": 0,
  "rssi": -40,
  "led_off": 0,
  "latitude": 0.0,
  "longitude": 0.0
}"#;

pub const LB110_SYSINFO_OFF: &str = r#"{
  "sw_ver": "1.8.6 Build 180809 Rel.091659",
  "hw_ver": "1.0",
  "model": "LB110(EU)",
  "description": "Smart Wi-Fi LED Bulb with Dimmable Light",
  "alias": "Lamp",
  "mic_type": "IOT.SMARTBULB",
  "dev_state": "normal",
  "mic_mac": "000000000000",
  "deviceId": "8006A8B7C3E0A1D7D31E9E0F4E2C1B0A00000003",
  "oemId": "A68E15472071CB761E5CCFB388A1D8AE",
  "hwId": "00000000000000000000000000000000",
  "is_factory": false,
  "disco_ver": "1.0",
  "ctrl_protocols": {
    "name": "Linkie",
    "version": "1.0"
  },
  "light_state": {
    "on_off": 0,
    "dft_on_state": {
      "mode": "normal",
      "hue": 0,
      "saturation": 0,
      "color_temp": 2700,
      "brightness": 1
    }
  },
  "is_dimmable": 1,
  "is_color": 0,
  "is_variable_color_temp": 0,
  "rssi": -51,
  "active_mode": "none",
  "heapsize": 290056,
  "err_code": 0
}"#;

pub const LB130_SYSINFO: &str = r#"{
  "sw_ver": "1.8.11 Build 191113 Rel.105336",
  "hw_ver": "1.0",
  "model": "LB130(EU)",
  "description": "Smart Wi-Fi LED Bulb with Color Changing",
  "alias": "Living Room",
  "mic_type": "IOT.SMARTBULB",
  "dev_state": "normal",
  "mic_mac": "50C7BF000001",
  "deviceId": "8012A8B7C3E0A1D7D31E9E0F4E2C1B0A00000004",
  "oemId": "D5C424D3C480911A3A1C9A9A6E22C98B",
  "hwId": "111E35908497A05512E259BB76801E10",
  "is_factory": false,
  "disco_ver": "1.0",
  "light_state": {
    "on_off": 1,
    "mode": "normal",
    "hue": 120,
    "saturation": 75,
    "color_temp": 0,
    "brightness": 80
  },
  "is_dimmable": 1,
  "is_color": 1,
  "is_variable_color_temp": 1,
  "rssi": -62,
  "active_mode": "none",
  "heapsize": 332336,
  "err_code": 0
}"#;

pub fn addr(host: &str) -> SocketAddr {
    format!("{}:9999", host).parse().unwrap()
}

#[derive(Default)]
struct Inner {
    order: Vec<SocketAddr>,
    devices: HashMap<SocketAddr, Map<String, Value>>,
    requests: Vec<(SocketAddr, Value)>,
}

/// Devices keyed by address. Hosts added with `with_unreachable` are
/// discovered but time out on every request.
#[derive(Clone, Default)]
pub struct FakeNetwork {
    inner: Rc<RefCell<Inner>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(self, host: &str, sysinfo: &str) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            inner.order.push(addr(host));
            inner
                .devices
                .insert(addr(host), serde_json::from_str(sysinfo).unwrap());
        }
        self
    }

    pub fn with_unreachable(self, host: &str) -> Self {
        self.inner.borrow_mut().order.push(addr(host));
        self
    }

    pub fn connection(&self, host: &str) -> Connection {
        Connection::with_protocol(addr(host), Box::new(self.clone()))
    }

    pub fn device(&self, host: &str) -> Device {
        Device::connect_with(self.connection(host)).unwrap()
    }

    pub fn sysinfo(&self, host: &str) -> Map<String, Value> {
        self.inner.borrow().devices[&addr(host)].clone()
    }

    pub fn requests(&self) -> Vec<(SocketAddr, Value)> {
        self.inner.borrow().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.inner.borrow_mut().requests.clear();
    }
}

impl Discover for FakeNetwork {
    fn discover(&self) -> Result<Vec<SocketAddr>> {
        Ok(self.inner.borrow().order.clone())
    }
}

impl Protocol for FakeNetwork {
    fn send(&self, addr: SocketAddr, msg: &str) -> Result<String> {
        let request: Value = serde_json::from_str(msg)?;
        let mut inner = self.inner.borrow_mut();
        inner.requests.push((addr, request.clone()));

        let sysinfo = match inner.devices.get_mut(&addr) {
            Some(sysinfo) => sysinfo,
            None => {
                return Err(Error::unreachable(
                    addr,
                    io::Error::new(io::ErrorKind::TimedOut, "timed out"),
                ))
            }
        };

        let mut response = Map::new();
        for (module, methods) in request.as_object().into_iter().flatten() {
            let mut results = Map::new();
            for (method, args) in methods.as_object().into_iter().flatten() {
                results.insert(method.clone(), handle(sysinfo, module, method, args));
            }
            response.insert(module.clone(), Value::Object(results));
        }

        Ok(Value::Object(response).to_string())
    }
}

fn not_supported() -> Value {
    json!({"err_code": -1, "err_msg": "module not support"})
}

fn handle(sysinfo: &mut Map<String, Value>, module: &str, method: &str, args: &Value) -> Value {
    match (module, method) {
        ("system", "get_sysinfo") => Value::Object(sysinfo.clone()),
        ("system", "set_relay_state") if sysinfo.contains_key("relay_state") => {
            sysinfo.insert(String::from("relay_state"), args["state"].clone());
            json!({"err_code": 0})
        }
        ("system", "reboot") if sysinfo.contains_key("relay_state") => json!({"err_code": 0}),
        (BULB_SYSTEM, "reboot") if sysinfo.contains_key("light_state") => json!({"err_code": 0}),
        (LIGHT_SERVICE, "get_light_state") if sysinfo.contains_key("light_state") => {
            with_err_code(sysinfo["light_state"].clone())
        }
        (LIGHT_SERVICE, "transition_light_state") if sysinfo.contains_key("light_state") => {
            let state = transition(&sysinfo["light_state"], args);
            sysinfo.insert(String::from("light_state"), state.clone());
            with_err_code(state)
        }
        (BULB_EMETER, "get_realtime") if sysinfo.contains_key("light_state") => {
            json!({"power_mw": 1800, "err_code": 0})
        }
        (PLUG_EMETER, "get_realtime") if has_energy_meter(sysinfo) => {
            json!({"current": 0.1, "voltage": 240.0, "power": 12.5, "total": 1.0, "err_code": 0})
        }
        (BULB_EMETER, "get_daystat") | (PLUG_EMETER, "get_daystat") => {
            let (year, month) = (&args["year"], &args["month"]);
            let day = json!({"year": year, "month": month, "day": 1, "energy": 0.2});
            json!({"day_list": [day], "err_code": 0})
        }
        (BULB_EMETER, "get_monthstat") | (PLUG_EMETER, "get_monthstat") => {
            let month = json!({"year": args["year"], "month": 1, "energy": 4.2});
            json!({"month_list": [month], "err_code": 0})
        }
        _ => not_supported(),
    }
}

fn has_energy_meter(sysinfo: &Map<String, Value>) -> bool {
    sysinfo
        .get("feature")
        .and_then(Value::as_str)
        .map(|f| f.contains("ENE"))
        .unwrap_or(false)
}

fn with_err_code(mut state: Value) -> Value {
    state["err_code"] = json!(0);
    state
}

fn transition(current: &Value, args: &Value) -> Value {
    let mut settings = match current.get("dft_on_state") {
        Some(dft) => dft.clone(),
        None => {
            let mut settings = current.clone();
            if let Some(map) = settings.as_object_mut() {
                map.remove("on_off");
                map.remove("err_code");
            }
            settings
        }
    };
    for field in &["hue", "saturation", "brightness", "color_temp"] {
        if let Some(value) = args.get(*field) {
            settings[*field] = value.clone();
        }
    }

    let on_off = args
        .get("on_off")
        .cloned()
        .unwrap_or_else(|| current["on_off"].clone());
    if on_off == json!(0) {
        json!({"on_off": 0, "dft_on_state": settings})
    } else {
        let mut state = settings;
        state["on_off"] = on_off;
        state
    }
}
