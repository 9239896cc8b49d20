mod common;

use std::net::TcpListener;
use std::time::Duration;

use anyhow::Result;

#[test]
fn occupied_port_exits_with_failure() -> Result<()> {
    let listener = TcpListener::bind("0.0.0.0:0")?;
    let port = listener.local_addr()?.port();

    let status = common::run_to_exit(port, &[], Duration::from_secs(10))?;
    assert_eq!(status.code(), Some(1));
    Ok(())
}

#[test]
fn production_refuses_development_secret() -> Result<()> {
    let port = portpicker::pick_unused_port().expect("free port");

    let status = common::run_to_exit(
        port,
        &[("APP_ENV", "production"), ("SECURITY_JWT_SECRET", "dev-secret-change-me")],
        Duration::from_secs(10),
    )?;
    assert_eq!(status.code(), Some(1));
    Ok(())
}
