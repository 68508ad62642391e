use kasalink::Scanner;

fn main() {
    for device in Scanner::new().scan().unwrap() {
        println!(
            "{}\t{}\t{}",
            device.host(),
            device.name(),
            device.device_type()
        );
    }
}
