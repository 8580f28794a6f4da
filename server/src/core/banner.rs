//! Startup banner and URL display

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

// Label width, pads "OpenAPI:" and friends to one column
const W: usize = 10;

fn line(color: &str, label: &str, value: &str) {
    println!("  \x1b[{}m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m \x1b[36m{}\x1b[0m", color, label, value);
}

/// Print the startup banner with URLs
pub fn print_banner(host: &str, port: u16, data_dir: &str) {
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    line("32", "API:", &format!("http://{}:{}/api/v1", display_host, port));
    line(
        "33",
        "OpenAPI:",
        &format!("http://{}:{}/api/openapi.json", display_host, port),
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                line("32", "Network:", &format!("http://{}:{}", ip, port));
            }
        }
    } else {
        line("32", "Network:", &format!("http://{}:{}", host, port));
    }
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Data:", data_dir);

    println!();
}
