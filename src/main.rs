extern crate kasalink;

use std::{process, time::Duration};

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use kasalink::{
    config::{parse_addr, DiscoveryConfig},
    Color, Device, Error, Result, Scanner,
};

fn command_discover(json: bool, config: DiscoveryConfig) -> Result<()> {
    for device in Scanner::with_config(config).scan()? {
        if json {
            discover_print_json(&device)?;
        } else {
            discover_print_human(&device);
        }
    }
    Ok(())
}

fn discover_print_human(device: &Device) {
    let state = match device.is_on() {
        Ok(true) => "on",
        Ok(false) => "off",
        Err(_) => "unknown",
    };
    println!(
        "{}\t{}\t{}\t{}\t{}",
        device.host(),
        pad(device.name(), 18),
        pad(device.device_type(), 16),
        pad(device.model(), 12),
        state,
    );
}

fn pad(value: &str, padding: usize) -> String {
    let pad = " ".repeat(padding.saturating_sub(value.len()));
    format!("{}{}", value, pad)
}

fn discover_print_json(device: &Device) -> Result<()> {
    println!("{}", serde_json::to_string(&device.snapshot()?)?);
    Ok(())
}

fn device(matches: &ArgMatches) -> Result<Device> {
    let host = matches
        .value_of("host")
        .ok_or_else(|| Error::InvalidArguments(String::from("no device address given")))?;
    Device::connect(parse_addr(host)?)
}

fn number(matches: &ArgMatches, name: &str) -> Result<i32> {
    let value = matches.value_of(name).unwrap_or_default();
    value
        .parse()
        .map_err(|_| Error::InvalidArguments(format!("{} must be a number, got '{}'", name, value)))
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("discover", Some(sub)) => {
            let mut config = DiscoveryConfig::default();
            if sub.is_present("timeout") {
                let secs = number(sub, "timeout")?.max(1) as u64;
                config = config.with_timeout(Duration::from_secs(secs));
            }
            command_discover(matches.is_present("json") || sub.is_present("json"), config)
        }
        ("info", Some(sub)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&device(sub)?.snapshot()?)?
            );
            Ok(())
        }
        ("on", Some(sub)) => device(sub)?.turn_on(),
        ("off", Some(sub)) => device(sub)?.turn_off(),
        ("toggle", Some(sub)) => {
            let on = device(sub)?.toggle()?;
            println!("{}", if on { "on" } else { "off" });
            Ok(())
        }
        ("brightness", Some(sub)) => device(sub)?.set_brightness(number(sub, "percent")?),
        ("temperature", Some(sub)) => {
            device(sub)?.set_color_temperature(number(sub, "kelvin")?)
        }
        ("color", Some(sub)) => {
            let color: Color = sub.value_of("color").unwrap_or_default().parse()?;
            device(sub)?.set_color(&color)
        }
        ("reboot", Some(sub)) => {
            let delay = if sub.is_present("delay") {
                number(sub, "delay")?.max(0) as u64
            } else {
                1
            };
            device(sub)?.reboot(Duration::from_secs(delay))
        }
        ("emeter", Some(sub)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&device(sub)?.current_consumption()?)?
            );
            Ok(())
        }
        _ => Err(Error::InvalidArguments(String::from("unknown command"))),
    }
}

fn host_arg() -> Arg<'static, 'static> {
    Arg::with_name("host")
        .required(true)
        .help("Device address, optionally with a port")
}

fn main() {
    pretty_env_logger::init();

    let matches = App::new("Kasa smart device CLI")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Discover and control TPLink Kasa plugs and bulbs on the local network.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("json")
            .long("json")
            .takes_value(false)
            .global(true)
            .help("Respond with JSON.")
        )
        .subcommand(SubCommand::with_name("discover")
            .about("Discover devices on the local network")
            .arg(Arg::with_name("timeout")
                .long("timeout")
                .takes_value(true)
                .help("Seconds to wait for replies")
            )
        )
        .subcommand(SubCommand::with_name("info")
            .about("Print the current state of a device")
            .arg(host_arg())
        )
        .subcommand(SubCommand::with_name("on").about("Switch a device on").arg(host_arg()))
        .subcommand(SubCommand::with_name("off").about("Switch a device off").arg(host_arg()))
        .subcommand(SubCommand::with_name("toggle").about("Flip a device's state").arg(host_arg()))
        .subcommand(SubCommand::with_name("brightness")
            .about("Set a bulb's brightness")
            .arg(host_arg())
            .arg(Arg::with_name("percent").required(true).help("0 to 100"))
        )
        .subcommand(SubCommand::with_name("temperature")
            .about("Set a bulb's color temperature")
            .arg(host_arg())
            .arg(Arg::with_name("kelvin").required(true).help("e.g. 2700"))
        )
        .subcommand(SubCommand::with_name("color")
            .about("Set a bulb's color; black switches it off")
            .arg(host_arg())
            .arg(Arg::with_name("color").required(true).help("A color name or #rrggbb"))
        )
        .subcommand(SubCommand::with_name("reboot")
            .about("Restart a device")
            .arg(host_arg())
            .arg(Arg::with_name("delay")
                .long("delay")
                .takes_value(true)
                .help("Seconds to wait before restarting, 1 by default")
            )
        )
        .subcommand(SubCommand::with_name("emeter")
            .about("Print the current energy reading")
            .arg(host_arg())
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
