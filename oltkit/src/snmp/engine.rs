//! ONU discovery and detail queries.
//!
//! Every query opens its own SNMP v2c client, reads through
//! [`OnuSource`], and drops the client when it returns. A failed WALK fails
//! the query; a failed per-field GET leaves the field empty and records its
//! name in [`OnuInfo::unavailable`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_snmp::client::Retry;
use async_snmp::{Auth, Client};
use chrono::Utc;
use log::{debug, info};
use tokio::time::Instant;

use super::decode;
use super::profile::{OidProfile, OnuField};
use super::record::{DiscoveryResult, EmptySlot, OnuInfo};
use super::source::OnuSource;
use super::value::RawValue;
use crate::config::{DEFAULT_SNMP_PORT, EngineConfig};
use crate::error::{Result, SnmpError};
use crate::onu::{ONU_MAX, ONU_MIN, OnuAddress, PonAddress};

/// Target and scope of an SNMP query.
#[derive(Debug, Clone)]
pub struct SnmpRequest {
    pub host: String,
    pub port: u16,
    pub community: String,
    pub board: u32,
    pub pon: u32,

    /// Overrides the configured SNMP timeout when set and non-zero.
    pub timeout: Option<Duration>,
}

impl SnmpRequest {
    /// Create a request on the default SNMP port.
    pub fn new(host: impl Into<String>, community: impl Into<String>, board: u32, pon: u32) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SNMP_PORT,
            community: community.into(),
            board,
            pon,
            timeout: None,
        }
    }

    /// Set the agent port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The validated PON this request targets.
    pub fn pon_address(&self) -> Result<PonAddress> {
        Ok(PonAddress::new(self.board, self.pon)?)
    }
}

/// Runs ONU queries against OLT SNMP agents.
#[derive(Debug, Clone, Default)]
pub struct SnmpEngine {
    config: EngineConfig,
}

impl SnmpEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build a request on the configured SNMP port.
    pub fn request(
        &self,
        host: impl Into<String>,
        community: impl Into<String>,
        board: u32,
        pon: u32,
    ) -> SnmpRequest {
        SnmpRequest::new(host, community, board, pon).with_port(self.config.snmp_port)
    }

    async fn connect(&self, request: &SnmpRequest) -> Result<Client> {
        let timeout = request
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(self.config.snmp_timeout);
        let target = format!("{}:{}", request.host, request.port);
        debug!("SNMP v2c client for {} (timeout {:?})", target, timeout);

        let client = Client::builder(target, Auth::v2c(request.community.as_str()))
            .timeout(timeout)
            .retry(Retry::fixed(self.config.snmp_retries, Duration::ZERO))
            .connect()
            .await
            .map_err(SnmpError::from)?;
        Ok(client)
    }

    /// List every ONU registered on the request's PON.
    pub async fn discover(&self, request: &SnmpRequest) -> Result<DiscoveryResult> {
        let pon = request.pon_address()?;
        let client = self.connect(request).await?;
        discover_with(&client, &request.host, pon).await
    }

    /// Read one ONU without walking the PON.
    pub async fn onu_details(&self, request: &SnmpRequest, onu: u32) -> Result<OnuInfo> {
        let address = request.pon_address()?.onu(onu)?;
        let client = self.connect(request).await?;
        Ok(onu_details_with(&client, address).await)
    }

    /// ONU ids on the request's PON with no registered ONU.
    pub async fn empty_slots(&self, request: &SnmpRequest) -> Result<Vec<EmptySlot>> {
        let result = self.discover(request).await?;
        Ok(empty_slots_from(&result))
    }
}

/// Discovery over any [`OnuSource`].
pub async fn discover_with<S: OnuSource>(
    source: &S,
    host: &str,
    pon: PonAddress,
) -> Result<DiscoveryResult> {
    let start = Instant::now();
    let profile = OidProfile::new(pon)?;
    let root = profile.name_column();

    // Keyed by id: duplicates collapse and iteration is sorted.
    let mut names: BTreeMap<u32, String> = BTreeMap::new();
    for (oid, value) in source.walk(&root).await? {
        match oid.arcs().last() {
            Some(&id) => {
                names.insert(id, decode::text(&value));
            }
            None => debug!("walk row without index: {}", oid),
        }
    }

    let mut onus = Vec::with_capacity(names.len());
    for (id, name) in names {
        let mut onu = OnuInfo {
            board: pon.board,
            pon: pon.pon,
            id,
            name,
            ..Default::default()
        };
        for field in OnuField::DETAIL_FIELDS {
            read_field(source, &profile, &mut onu, field).await;
        }
        onus.push(onu);
    }

    let elapsed = start.elapsed();
    info!(
        "{} PON {}: {} ONUs in {:?}",
        host,
        pon,
        onus.len(),
        elapsed
    );

    Ok(DiscoveryResult {
        host: host.to_string(),
        board: pon.board,
        pon: pon.pon,
        total: onus.len(),
        onus,
        elapsed,
        timestamp: Utc::now(),
    })
}

/// Targeted read of one ONU over any [`OnuSource`].
pub async fn onu_details_with<S: OnuSource>(source: &S, address: OnuAddress) -> OnuInfo {
    let mut onu = OnuInfo::new(address);
    // Board and PON are validated by OnuAddress.
    let Ok(profile) = OidProfile::new(address.pon_address()) else {
        return onu;
    };

    read_field(source, &profile, &mut onu, OnuField::Name).await;
    for field in OnuField::DETAIL_FIELDS {
        read_field(source, &profile, &mut onu, field).await;
    }
    onu
}

/// ONU ids 1..=128 absent from a discovery result.
pub fn empty_slots_from(result: &DiscoveryResult) -> Vec<EmptySlot> {
    (ONU_MIN..=ONU_MAX)
        .filter(|id| result.get(*id).is_none())
        .map(|onu_id| EmptySlot {
            board: result.board,
            pon: result.pon,
            onu_id,
        })
        .collect()
}

async fn read_field<S: OnuSource>(
    source: &S,
    profile: &OidProfile,
    onu: &mut OnuInfo,
    field: OnuField,
) {
    let oid = profile.field_oid(field, onu.id);
    let decoded = match source.get(&oid).await {
        Ok(value) => decode_field(field, &value),
        Err(e) => Err(e),
    };

    match decoded {
        Ok(text) => set_field(onu, field, text),
        Err(e) => {
            debug!(
                "ONU {}/{}:{} {} unavailable: {}",
                onu.board, onu.pon, onu.id, field, e
            );
            onu.unavailable.push(field.name().to_string());
        }
    }
}

fn decode_field(field: OnuField, value: &RawValue) -> std::result::Result<String, SnmpError> {
    match field {
        OnuField::Name | OnuField::Description | OnuField::Type | OnuField::IpAddress => {
            Ok(decode::text(value))
        }
        OnuField::SerialNumber => Ok(decode::serial(value)),
        OnuField::RxPower | OnuField::TxPower => decode::power(value),
        OnuField::Status => Ok(decode::status(value).to_string()),
        OnuField::LastOnline | OnuField::LastOffline => decode::timestamp(value),
        OnuField::LastOfflineReason => Ok(decode::offline_reason(value).to_string()),
        OnuField::OpticalDistance => Ok(decode::distance(value)),
    }
}

fn set_field(onu: &mut OnuInfo, field: OnuField, text: String) {
    match field {
        OnuField::Name => onu.name = text,
        OnuField::Description => onu.description = text,
        OnuField::Type => onu.onu_type = text,
        OnuField::SerialNumber => onu.serial_number = text,
        OnuField::RxPower => onu.rx_power = text,
        OnuField::TxPower => onu.tx_power = text,
        OnuField::Status => onu.status = text,
        OnuField::IpAddress => onu.ip_address = text,
        OnuField::LastOnline => {
            onu.uptime = decode::uptime(&text);
            onu.last_online = text;
        }
        OnuField::LastOffline => onu.last_offline = text,
        OnuField::LastOfflineReason => onu.last_offline_reason = text,
        OnuField::OpticalDistance => onu.gpon_optical_distance = text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_snmp::Oid;
    use std::collections::HashMap;

    /// In-memory agent.
    #[derive(Default)]
    struct FakeSource {
        values: HashMap<String, RawValue>,
        rows: Vec<(Oid, RawValue)>,
        walk_fails: bool,
    }

    impl FakeSource {
        fn set(&mut self, profile: &OidProfile, field: OnuField, id: u32, value: RawValue) {
            self.values
                .insert(profile.field_oid(field, id).to_string(), value);
        }

        fn row(&mut self, profile: &OidProfile, id: u32, name: &str) {
            self.rows
                .push((profile.field_oid(OnuField::Name, id), RawValue::from(name)));
        }
    }

    impl OnuSource for FakeSource {
        async fn get(&self, oid: &Oid) -> std::result::Result<RawValue, SnmpError> {
            self.values
                .get(&oid.to_string())
                .cloned()
                .ok_or_else(|| SnmpError::FieldUnavailable {
                    oid: oid.to_string(),
                })
        }

        async fn walk(&self, _root: &Oid) -> std::result::Result<Vec<(Oid, RawValue)>, SnmpError> {
            if self.walk_fails {
                return Err(SnmpError::decode("walk refused"));
            }
            Ok(self.rows.clone())
        }
    }

    fn pon() -> PonAddress {
        PonAddress::new(1, 2).unwrap()
    }

    fn populated() -> (FakeSource, OidProfile) {
        let profile = OidProfile::new(pon()).unwrap();
        let mut source = FakeSource::default();
        source.row(&profile, 3, "first-three");
        source.row(&profile, 1, "one");
        source.row(&profile, 3, "three");

        source.set(&profile, OnuField::Status, 1, RawValue::Integer(4));
        source.set(&profile, OnuField::RxPower, 1, RawValue::Integer(1500));
        source.set(&profile, OnuField::TxPower, 1, RawValue::Integer(16_000));
        source.set(&profile, OnuField::SerialNumber, 1, RawValue::from("1,ZTEG00000001"));
        source.set(&profile, OnuField::Type, 1, RawValue::from("F660V7.0"));
        source.set(&profile, OnuField::Description, 1, RawValue::from("customer 1"));
        source.set(&profile, OnuField::IpAddress, 1, RawValue::from("10.9.8.7"));
        source.set(
            &profile,
            OnuField::LastOnline,
            1,
            RawValue::from(vec![0x07, 0xE8, 6, 15, 12, 30, 0, 0]),
        );
        source.set(
            &profile,
            OnuField::LastOffline,
            1,
            RawValue::from(vec![0x07, 0xE8, 6, 14, 8, 0, 0, 0]),
        );
        source.set(&profile, OnuField::LastOfflineReason, 1, RawValue::Integer(9));
        source.set(&profile, OnuField::OpticalDistance, 1, RawValue::Integer(2345));
        // Name GET for the targeted read.
        source.set(&profile, OnuField::Name, 1, RawValue::from("one"));
        (source, profile)
    }

    #[tokio::test]
    async fn test_discover_sorted_unique() {
        let (source, _) = populated();
        let result = discover_with(&source, "10.0.0.1", pon()).await.unwrap();

        let ids: Vec<u32> = result.onus.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(result.total, 2);
        assert_eq!(result.get(3).unwrap().name, "three");
    }

    #[tokio::test]
    async fn test_discover_decodes_fields() {
        let (source, _) = populated();
        let result = discover_with(&source, "10.0.0.1", pon()).await.unwrap();
        let onu = result.get(1).unwrap();

        assert_eq!(onu.board, 1);
        assert_eq!(onu.pon, 2);
        assert_eq!(onu.name, "one");
        assert_eq!(onu.status, "Online");
        assert_eq!(onu.rx_power, "-27.00");
        assert_eq!(onu.tx_power, "2.00");
        assert_eq!(onu.serial_number, "ZTEG00000001");
        assert_eq!(onu.onu_type, "F660V7.0");
        assert_eq!(onu.ip_address, "10.9.8.7");
        assert_eq!(onu.last_online, "2024-06-15 12:30:00");
        assert_eq!(onu.last_offline, "2024-06-14 08:00:00");
        assert_eq!(onu.last_offline_reason, "PowerOff");
        assert_eq!(onu.gpon_optical_distance, "2.3km");
        assert!(onu.uptime.ends_with("seconds"));
        assert!(onu.is_complete());
    }

    #[tokio::test]
    async fn test_partial_failure_leaves_empty_fields() {
        let (source, _) = populated();
        let result = discover_with(&source, "10.0.0.1", pon()).await.unwrap();
        let onu = result.get(3).unwrap();

        assert_eq!(onu.status, "");
        assert_eq!(onu.rx_power, "");
        assert_eq!(onu.uptime, "");
        assert_eq!(onu.unavailable.len(), OnuField::DETAIL_FIELDS.len());
        assert!(onu.unavailable.contains(&"serial_number".to_string()));
    }

    #[tokio::test]
    async fn test_walk_failure_fails_discovery() {
        let source = FakeSource {
            walk_fails: true,
            ..Default::default()
        };
        let err = discover_with(&source, "h", pon()).await.unwrap_err();
        assert!(matches!(err, Error::Snmp(_)));
    }

    #[tokio::test]
    async fn test_onu_details_reads_name() {
        let (source, _) = populated();
        let onu = onu_details_with(&source, pon().onu(1).unwrap()).await;
        assert_eq!(onu.id, 1);
        assert_eq!(onu.name, "one");
        assert_eq!(onu.status, "Online");
        assert!(onu.is_complete());
    }

    #[tokio::test]
    async fn test_empty_slots() {
        let (source, _) = populated();
        let result = discover_with(&source, "h", pon()).await.unwrap();
        let slots = empty_slots_from(&result);

        assert_eq!(slots.len(), 126);
        assert_eq!(
            slots[0],
            EmptySlot {
                board: 1,
                pon: 2,
                onu_id: 2
            }
        );
        assert!(slots.iter().all(|s| s.onu_id != 1 && s.onu_id != 3));
        assert_eq!(slots.last().unwrap().onu_id, 128);
    }

    #[tokio::test]
    async fn test_engine_validates_before_connect() {
        let engine = SnmpEngine::default();
        let err = engine
            .discover(&SnmpRequest::new("192.0.2.1", "public", 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Address(_)));

        let request = engine.request("192.0.2.1", "public", 1, 1);
        assert_eq!(request.port, 161);
        let err = engine.onu_details(&request, 0).await.unwrap_err();
        assert!(matches!(err, Error::Address(_)));
    }
}
