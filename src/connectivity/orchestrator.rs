//! Detection orchestrator - one linear pass from lookups to verdict

use super::cgnat::CgnatRange;
use super::decision::classify;
use super::interfaces::LocalAddressSource;
use super::source::PublicAddressSource;
use super::types::{DetectionError, DetectionReport};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Run a full CGNAT detection pass
///
/// The steps run strictly in order:
/// 1. Enumerate local IPv4 addresses
/// 2. Discover the public address
/// 3. Test both against `range` and classify
///
/// Any failure aborts the pass; there is no partial report.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use cgnat_check::connectivity::{run_detection, CgnatRange, StunSource, SystemInterfaces};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stun = StunSource::new("stun.l.google.com:19302", Duration::from_secs(5));
/// let report = run_detection(&SystemInterfaces, &stun, CgnatRange::SHARED_ADDRESS_SPACE).await?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub async fn run_detection(
    local: &dyn LocalAddressSource,
    public: &dyn PublicAddressSource,
    range: CgnatRange,
) -> Result<DetectionReport, DetectionError> {
    info!("Starting CGNAT detection (range {})", range);

    let local_addresses = local.list_ipv4()?;
    debug!("Local IPv4 addresses: {:?}", local_addresses);

    let local_match = local_addresses.iter().find(|ip| range.contains(**ip));
    let local_cgnat = local_match.is_some();
    if let Some(ip) = local_match {
        warn!("Local interface address {} is in CGNAT range {}", ip, range);
    }

    info!(
        "Discovering public address via {} {}",
        public.method(),
        public.endpoint()
    );
    let public_ip = public.discover().await?;
    let public_cgnat = range.contains(public_ip);
    if public_cgnat {
        warn!("Public address {} is in CGNAT range {}", public_ip, range);
    }

    let verdict = classify(local_cgnat, public_cgnat);
    info!("Verdict: {}", verdict);

    Ok(DetectionReport {
        local_addresses,
        local_cgnat,
        public_ip,
        public_cgnat,
        method: public.method(),
        endpoint: public.endpoint().to_string(),
        verdict,
        checked_at: Utc::now(),
    })
}
