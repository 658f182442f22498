//! Option collection.
//!
//! [`ConfigBuilder`] records which options the caller set explicitly and rejects
//! malformed values and contradictions with options that are already set. It
//! never fills in defaults. Everything that depends on the full set of options
//! is left to [`finalize`](crate::finalize::finalize).

use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::capability::{
    CertificateProvider, CertificateVerifier, ConnectionIdGenerator, ConnectionListener, DtlsHealth,
    PskStore, ResumptionVerifier,
};
use crate::cipher_suite::{contains_psk_based, CipherSuite};
use crate::config::Config;
use crate::error::OptionError;
use crate::finalize::finalize;
use crate::platform::Platform;
use crate::types::{
    ExtendedMasterSecretMode, HandshakeMode, NamedGroup, ProtocolVersion, SignatureAndHashAlgorithm,
};
use crate::Error;

pub const MIN_RECORD_SIZE_LIMIT: u32 = 64;
pub const MAX_RECORD_SIZE_LIMIT: u32 = 65535;

/// The options set so far, `None` for unset.
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub(crate) logging_tag: Option<String>,
    pub(crate) address: Option<SocketAddr>,
    pub(crate) enable_address_reuse: Option<bool>,

    pub(crate) client_only: Option<bool>,
    pub(crate) server_only: Option<bool>,
    pub(crate) default_handshake_mode: Option<HandshakeMode>,
    pub(crate) client_auth_wanted: Option<bool>,
    pub(crate) client_auth_required: Option<bool>,

    pub(crate) psk_store: Option<Arc<dyn PskStore>>,
    pub(crate) certificate_identity: Option<Arc<dyn CertificateProvider>>,
    pub(crate) certificate_verifier: Option<Arc<dyn CertificateVerifier>>,

    pub(crate) cipher_suites: Option<Vec<CipherSuite>>,
    pub(crate) preselected_cipher_suites: Option<Vec<CipherSuite>>,
    pub(crate) recommended_cipher_suites_only: Option<bool>,
    pub(crate) signature_algorithms: Option<Vec<SignatureAndHashAlgorithm>>,
    pub(crate) recommended_signature_and_hash_algorithms_only: Option<bool>,
    pub(crate) supported_groups: Option<Vec<NamedGroup>>,
    pub(crate) recommended_supported_groups_only: Option<bool>,

    pub(crate) retransmission_timeout: Option<Duration>,
    pub(crate) additional_timeout_for_ecc: Option<Duration>,
    pub(crate) max_retransmissions: Option<u32>,
    pub(crate) backoff_retransmission: Option<u32>,
    pub(crate) early_stop_retransmission: Option<bool>,

    pub(crate) max_transmission_unit: Option<usize>,
    pub(crate) max_transmission_unit_limit: Option<usize>,
    pub(crate) max_fragment_length_code: Option<u8>,
    pub(crate) record_size_limit: Option<u16>,
    pub(crate) max_fragmented_handshake_message_length: Option<usize>,
    pub(crate) enable_multi_record_messages: Option<bool>,
    pub(crate) enable_multi_handshake_message_records: Option<bool>,

    pub(crate) outbound_message_buffer_size: Option<usize>,
    pub(crate) max_deferred_outgoing_application_data_messages: Option<usize>,
    pub(crate) max_deferred_incoming_records_size: Option<usize>,
    pub(crate) max_connections: Option<usize>,
    pub(crate) stale_connection_threshold: Option<Duration>,
    pub(crate) connection_thread_count: Option<usize>,
    pub(crate) receiver_thread_count: Option<usize>,
    pub(crate) socket_receive_buffer_size: Option<usize>,
    pub(crate) socket_send_buffer_size: Option<usize>,

    pub(crate) health_status_interval: Option<Duration>,
    pub(crate) health_handler: Option<Arc<dyn DtlsHealth>>,
    pub(crate) connection_listener: Option<Arc<dyn ConnectionListener>>,

    pub(crate) auto_resumption_timeout: Option<Duration>,
    pub(crate) use_server_session_id: Option<bool>,
    pub(crate) resumption_verifier: Option<Arc<dyn ResumptionVerifier>>,
    pub(crate) verify_peers_on_resumption_threshold: Option<u8>,

    pub(crate) use_hello_verify_request: Option<bool>,
    pub(crate) use_hello_verify_request_for_psk: Option<bool>,
    pub(crate) protocol_version_for_hello_verify_requests: Option<ProtocolVersion>,

    pub(crate) use_anti_replay_filter: Option<bool>,
    pub(crate) use_extended_window_filter: Option<i32>,
    pub(crate) connection_id_generator: Option<Arc<dyn ConnectionIdGenerator>>,
    pub(crate) cid_update_address_on_newer_record_filter: Option<bool>,

    pub(crate) sni_enabled: Option<bool>,
    pub(crate) extended_master_secret_mode: Option<ExtendedMasterSecretMode>,
    pub(crate) truncate_client_certificate_path: Option<bool>,
    pub(crate) truncate_certificate_path_for_validation: Option<bool>,
}

fn conflict(option: &'static str, conflicting: &'static str) -> Error {
    OptionError::Conflict {
        option,
        conflicting,
    }
    .into()
}

fn at_least(option: &'static str, value: u64, min: u64, expected: &'static str) -> Result<(), Error> {
    if value < min {
        return Err(OptionError::OutOfRange {
            option,
            value,
            expected,
        }
        .into());
    }
    Ok(())
}

fn duration_at_least(
    option: &'static str,
    value: Duration,
    min: Duration,
    expected: &'static str,
) -> Result<(), Error> {
    if value < min {
        return Err(OptionError::OutOfRange {
            option,
            value: value.as_millis() as u64,
            expected,
        }
        .into());
    }
    Ok(())
}

/// Names of the entries that are not recommended, `None` if all are.
pub(crate) fn not_recommended<T, F>(items: &[T], is_recommended: F) -> Option<String>
where
    T: Display,
    F: Fn(&T) -> bool,
{
    let names: Vec<String> = items
        .iter()
        .filter(|item| !is_recommended(item))
        .map(|item| item.to_string())
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

fn verify_recommended<T, F>(kind: &'static str, items: &[T], is_recommended: F) -> Result<(), Error>
where
    T: Display,
    F: Fn(&T) -> bool,
{
    match not_recommended(items, is_recommended) {
        Some(names) => Err(OptionError::NotRecommended { kind, names }.into()),
        None => Ok(()),
    }
}

fn parse_all<T>(names: &[&str]) -> Result<Vec<T>, Error>
where
    T: std::str::FromStr<Err = OptionError>,
{
    names
        .iter()
        .map(|name| name.trim().parse::<T>().map_err(Error::from))
        .collect()
}

/// Builder for DTLS connector configuration.
///
/// Setters of options with constraints return `Result`, so a chain reads
/// `Config::builder().max_connections(10)?.sni_enabled(true).build()?`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    raw: RawOptions,
}

impl ConfigBuilder {
    pub(crate) fn new() -> Self {
        ConfigBuilder::default()
    }

    pub(crate) fn from_raw(raw: RawOptions) -> Self {
        ConfigBuilder { raw }
    }

    /// The options collected so far.
    pub fn raw_options(&self) -> &RawOptions {
        &self.raw
    }

    /// Give up the builder, keeping the collected options.
    pub fn into_raw_options(self) -> RawOptions {
        self.raw
    }

    /// Build the configuration for the host platform.
    ///
    /// Same as [`build_with`](Self::build_with) using [`Platform::detect()`].
    pub fn build(self) -> Result<Config, Error> {
        self.build_with(&Platform::detect())
    }

    /// Build the configuration for the given platform.
    ///
    /// Fills unset options with defaults, derives cipher suites, signature
    /// algorithms and groups, and checks that all options fit together.
    pub fn build_with(self, platform: &Platform) -> Result<Config, Error> {
        finalize(self.raw, platform)
    }

    // ========================================================================
    // General
    // ========================================================================

    /// Set the tag prefixed to log messages.
    ///
    /// A space is appended to non-empty tags.
    pub fn logging_tag(mut self, tag: impl Into<String>) -> Self {
        self.raw.logging_tag = Some(tag.into());
        self
    }

    /// Set the local address to bind to.
    ///
    /// Defaults to `0.0.0.0:0`.
    pub fn address(mut self, address: SocketAddr) -> Self {
        self.raw.address = Some(address);
        self
    }

    /// Defaults to false.
    pub fn enable_address_reuse(mut self, enable: bool) -> Self {
        self.raw.enable_address_reuse = Some(enable);
        self
    }

    // ========================================================================
    // Roles
    // ========================================================================

    /// Set whether the connector only acts as client.
    ///
    /// Fails if server side options are already set.
    pub fn client_only(mut self, enable: bool) -> Result<Self, Error> {
        if enable {
            let raw = &self.raw;
            if raw.server_only == Some(true) {
                return Err(conflict("client only", "server only"));
            }
            if raw.client_auth_wanted.is_some() || raw.client_auth_required.is_some() {
                return Err(conflict("client only", "client authentication"));
            }
            if raw.use_server_session_id == Some(false) {
                return Err(conflict("client only", "disabled server session id"));
            }
            if raw.use_hello_verify_request_for_psk == Some(false) {
                return Err(conflict("client only", "disabled HELLO_VERIFY_REQUEST for PSK"));
            }
            if raw.use_hello_verify_request == Some(false) {
                return Err(conflict("client only", "disabled HELLO_VERIFY_REQUEST"));
            }
        }
        self.raw.client_only = Some(enable);
        Ok(self)
    }

    /// Set whether the connector only acts as server.
    pub fn server_only(mut self, enable: bool) -> Result<Self, Error> {
        if enable {
            if self.raw.client_only == Some(true) {
                return Err(conflict("server only", "client only"));
            }
            if self.raw.default_handshake_mode == Some(HandshakeMode::Auto) {
                return Err(conflict("server only", "default handshake mode 'auto'"));
            }
        }
        self.raw.server_only = Some(enable);
        Ok(self)
    }

    /// Set whether sending to a peer without session starts a handshake.
    ///
    /// Defaults to `None` for server only, `Auto` otherwise.
    pub fn default_handshake_mode(mut self, mode: HandshakeMode) -> Result<Self, Error> {
        if self.raw.server_only == Some(true) && mode != HandshakeMode::None {
            return Err(conflict("default handshake mode 'auto'", "server only"));
        }
        self.raw.default_handshake_mode = Some(mode);
        Ok(self)
    }

    /// Set the default handshake mode by name, "auto" or "none".
    pub fn default_handshake_mode_by_name(self, name: &str) -> Result<Self, Error> {
        let mode = match name {
            "auto" => HandshakeMode::Auto,
            "none" => HandshakeMode::None,
            _ => {
                return Err(OptionError::UnknownName {
                    kind: "default handshake mode",
                    name: name.to_string(),
                }
                .into())
            }
        };
        self.default_handshake_mode(mode)
    }

    /// For a server, ask clients for a certificate without requiring one.
    pub fn client_auth_wanted(mut self, wanted: bool) -> Result<Self, Error> {
        if self.raw.client_only == Some(true) {
            return Err(conflict("client authentication", "client only"));
        }
        if wanted && self.raw.client_auth_required == Some(true) {
            return Err(conflict("client authentication wanted", "client authentication required"));
        }
        self.raw.client_auth_wanted = Some(wanted);
        Ok(self)
    }

    /// For a server, require a client certificate.
    ///
    /// Defaults to true, unless client authentication is wanted.
    pub fn client_auth_required(mut self, required: bool) -> Result<Self, Error> {
        if self.raw.client_only == Some(true) {
            return Err(conflict("client authentication", "client only"));
        }
        if required && self.raw.client_auth_wanted == Some(true) {
            return Err(conflict("client authentication required", "client authentication wanted"));
        }
        self.raw.client_auth_required = Some(required);
        Ok(self)
    }

    // ========================================================================
    // Credentials
    // ========================================================================

    pub fn psk_store(mut self, store: Arc<dyn PskStore>) -> Self {
        self.raw.psk_store = Some(store);
        self
    }

    pub fn certificate_identity(mut self, identity: Arc<dyn CertificateProvider>) -> Self {
        self.raw.certificate_identity = Some(identity);
        self
    }

    pub fn certificate_verifier(mut self, verifier: Arc<dyn CertificateVerifier>) -> Self {
        self.raw.certificate_verifier = Some(verifier);
        self
    }

    // ========================================================================
    // Algorithms
    // ========================================================================

    /// Only allow recommended cipher suites. Defaults to true.
    ///
    /// Enabling it fails if not recommended cipher suites are already set.
    pub fn recommended_cipher_suites_only(mut self, enable: bool) -> Result<Self, Error> {
        if enable {
            if let Some(suites) = &self.raw.cipher_suites {
                verify_recommended("cipher suites", suites, CipherSuite::is_recommended)?;
            }
        }
        self.raw.recommended_cipher_suites_only = Some(enable);
        Ok(self)
    }

    /// Only allow recommended groups (curves). Defaults to true.
    pub fn recommended_supported_groups_only(mut self, enable: bool) -> Result<Self, Error> {
        if enable {
            if let Some(groups) = &self.raw.supported_groups {
                verify_recommended("supported groups (curves)", groups, NamedGroup::is_recommended)?;
            }
        }
        self.raw.recommended_supported_groups_only = Some(enable);
        Ok(self)
    }

    /// Only allow recommended signature and hash algorithms. Defaults to true.
    pub fn recommended_signature_and_hash_algorithms_only(
        mut self,
        enable: bool,
    ) -> Result<Self, Error> {
        if enable {
            if let Some(algorithms) = &self.raw.signature_algorithms {
                verify_recommended(
                    "signature and hash algorithms",
                    algorithms,
                    SignatureAndHashAlgorithm::is_recommended,
                )?;
            }
        }
        self.raw.recommended_signature_and_hash_algorithms_only = Some(enable);
        Ok(self)
    }

    /// Set the cipher suites, in order of preference.
    ///
    /// Without explicit cipher suites they are derived from the credentials.
    pub fn cipher_suites(mut self, suites: Vec<CipherSuite>) -> Result<Self, Error> {
        if suites.is_empty() {
            return Err(OptionError::EmptyList("cipher suites").into());
        }
        if suites.contains(&CipherSuite::NULL_WITH_NULL_NULL) {
            return Err(OptionError::NullCipherSuite.into());
        }
        if self.raw.use_hello_verify_request_for_psk == Some(false) && !contains_psk_based(&suites)
        {
            return Err(OptionError::NoPskCipherSuite.into());
        }
        if self.raw.recommended_cipher_suites_only != Some(false) {
            verify_recommended("cipher suites", &suites, CipherSuite::is_recommended)?;
        }
        self.raw.cipher_suites = Some(suites);
        Ok(self)
    }

    /// Set the cipher suites by IANA name, e.g. "TLS_PSK_WITH_AES_128_CCM_8".
    pub fn cipher_suites_by_name(self, names: &[&str]) -> Result<Self, Error> {
        let suites = parse_all(names)?;
        self.cipher_suites(suites)
    }

    /// Restrict derived cipher suites to these, in this order.
    ///
    /// Ignored when cipher suites are set explicitly.
    pub fn preselected_cipher_suites(mut self, suites: Vec<CipherSuite>) -> Result<Self, Error> {
        if suites.is_empty() {
            return Err(OptionError::EmptyList("preselected cipher suites").into());
        }
        if suites.contains(&CipherSuite::NULL_WITH_NULL_NULL) {
            return Err(OptionError::NullCipherSuite.into());
        }
        if self.raw.use_hello_verify_request_for_psk == Some(false) && !contains_psk_based(&suites)
        {
            return Err(OptionError::NoPskCipherSuite.into());
        }
        self.raw.preselected_cipher_suites = Some(suites);
        Ok(self)
    }

    pub fn preselected_cipher_suites_by_name(self, names: &[&str]) -> Result<Self, Error> {
        let suites = parse_all(names)?;
        self.preselected_cipher_suites(suites)
    }

    /// Set the signature and hash algorithms, in order of preference.
    ///
    /// Without explicit algorithms, ECC based cipher suites use defaults
    /// extended by what the certificates need.
    pub fn signature_algorithms(
        mut self,
        algorithms: Vec<SignatureAndHashAlgorithm>,
    ) -> Result<Self, Error> {
        if algorithms.is_empty() {
            return Err(OptionError::EmptyList("signature and hash algorithms").into());
        }
        if self.raw.recommended_signature_and_hash_algorithms_only != Some(false) {
            verify_recommended(
                "signature and hash algorithms",
                &algorithms,
                SignatureAndHashAlgorithm::is_recommended,
            )?;
        }
        self.raw.signature_algorithms = Some(algorithms);
        Ok(self)
    }

    /// Set the signature and hash algorithms by name, e.g. "SHA256withECDSA".
    pub fn signature_algorithms_by_name(self, names: &[&str]) -> Result<Self, Error> {
        let algorithms = parse_all(names)?;
        self.signature_algorithms(algorithms)
    }

    /// Set the groups (curves), in order of preference.
    pub fn supported_groups(mut self, groups: Vec<NamedGroup>) -> Result<Self, Error> {
        if groups.is_empty() {
            return Err(OptionError::EmptyList("supported groups (curves)").into());
        }
        if self.raw.recommended_supported_groups_only != Some(false) {
            verify_recommended("supported groups (curves)", &groups, NamedGroup::is_recommended)?;
        }
        self.raw.supported_groups = Some(groups);
        Ok(self)
    }

    /// Set the groups (curves) by name, e.g. "secp256r1".
    pub fn supported_groups_by_name(self, names: &[&str]) -> Result<Self, Error> {
        let groups = parse_all(names)?;
        self.supported_groups(groups)
    }

    // ========================================================================
    // Retransmission
    // ========================================================================

    /// Set the time before the first retransmission of a flight.
    ///
    /// Doubled for every retransmission. Defaults to 2 seconds.
    pub fn retransmission_timeout(mut self, timeout: Duration) -> Self {
        self.raw.retransmission_timeout = Some(timeout);
        self
    }

    /// Set the time added to the retransmission timeout of ECC flights.
    ///
    /// Defaults to 0.
    pub fn additional_timeout_for_ecc(mut self, timeout: Duration) -> Self {
        self.raw.additional_timeout_for_ecc = Some(timeout);
        self
    }

    /// Set the max number of retransmissions per flight.
    ///
    /// Defaults to 4.
    pub fn max_retransmissions(mut self, count: u32) -> Result<Self, Error> {
        at_least("max retransmissions", count as u64, 1, ">= 1")?;
        self.raw.max_retransmissions = Some(count);
        Ok(self)
    }

    /// Set the retransmissions after which flights are sent one record per datagram.
    ///
    /// 0 disables the back-off. Defaults to half of max retransmissions.
    pub fn backoff_retransmission(mut self, count: u32) -> Self {
        self.raw.backoff_retransmission = Some(count);
        self
    }

    /// Defaults to true.
    pub fn early_stop_retransmission(mut self, enable: bool) -> Self {
        self.raw.early_stop_retransmission = Some(enable);
        self
    }

    // ========================================================================
    // Datagram and record sizes
    // ========================================================================

    /// Set a fixed max transmission unit.
    ///
    /// Fails if an MTU limit is already set.
    pub fn max_transmission_unit(mut self, mtu: usize) -> Result<Self, Error> {
        if self.raw.max_transmission_unit_limit.is_some() {
            return Err(conflict("MTU", "MTU limit"));
        }
        self.raw.max_transmission_unit = Some(mtu);
        Ok(self)
    }

    /// Set an upper bound for the MTU detected from the network interface.
    ///
    /// Fails if a fixed MTU is already set. Defaults to 1500.
    pub fn max_transmission_unit_limit(mut self, limit: usize) -> Result<Self, Error> {
        if self.raw.max_transmission_unit.is_some() {
            return Err(conflict("MTU limit", "MTU"));
        }
        self.raw.max_transmission_unit_limit = Some(limit);
        Ok(self)
    }

    /// Set the max fragment length code (RFC 6066), one of 1, 2, 3 or 4.
    pub fn max_fragment_length_code(mut self, code: u8) -> Result<Self, Error> {
        if !(1..=4).contains(&code) {
            return Err(OptionError::OutOfRange {
                option: "max fragment length code",
                value: code as u64,
                expected: "{1, 2, 3, 4}",
            }
            .into());
        }
        self.raw.max_fragment_length_code = Some(code);
        Ok(self)
    }

    /// Set the record size limit (RFC 8449), within [64, 65535].
    pub fn record_size_limit(mut self, limit: u32) -> Result<Self, Error> {
        if !(MIN_RECORD_SIZE_LIMIT..=MAX_RECORD_SIZE_LIMIT).contains(&limit) {
            return Err(OptionError::OutOfRange {
                option: "record size limit",
                value: limit as u64,
                expected: "[64, 65535]",
            }
            .into());
        }
        self.raw.record_size_limit = Some(limit as u16);
        Ok(self)
    }

    /// Set the max length of reassembled handshake messages.
    ///
    /// Defaults to 8192.
    pub fn max_fragmented_handshake_message_length(mut self, length: usize) -> Result<Self, Error> {
        at_least("max fragmented handshake message length", length as u64, 1, ">= 1")?;
        self.raw.max_fragmented_handshake_message_length = Some(length);
        Ok(self)
    }

    /// Defaults to true.
    pub fn enable_multi_record_messages(mut self, enable: bool) -> Self {
        self.raw.enable_multi_record_messages = Some(enable);
        self
    }

    /// Defaults to false.
    pub fn enable_multi_handshake_message_records(mut self, enable: bool) -> Self {
        self.raw.enable_multi_handshake_message_records = Some(enable);
        self
    }

    // ========================================================================
    // Connections and resources
    // ========================================================================

    /// Defaults to 100000.
    pub fn outbound_message_buffer_size(mut self, capacity: usize) -> Result<Self, Error> {
        at_least("outbound message buffer size", capacity as u64, 1, ">= 1")?;
        self.raw.outbound_message_buffer_size = Some(capacity);
        Ok(self)
    }

    /// Defaults to 10.
    pub fn max_deferred_outgoing_application_data_messages(mut self, max: usize) -> Self {
        self.raw.max_deferred_outgoing_application_data_messages = Some(max);
        self
    }

    /// Defaults to 8192.
    pub fn max_deferred_incoming_records_size(mut self, max: usize) -> Self {
        self.raw.max_deferred_incoming_records_size = Some(max);
        self
    }

    /// Defaults to 150000.
    pub fn max_connections(mut self, max: usize) -> Result<Self, Error> {
        at_least("max connections", max as u64, 1, ">= 1")?;
        self.raw.max_connections = Some(max);
        Ok(self)
    }

    /// Set the inactivity after which a connection may be evicted.
    ///
    /// At least one second. Defaults to 30 minutes.
    pub fn stale_connection_threshold(mut self, threshold: Duration) -> Result<Self, Error> {
        duration_at_least(
            "stale connection threshold",
            threshold,
            Duration::from_secs(1),
            ">= 1s",
        )?;
        self.raw.stale_connection_threshold = Some(threshold);
        Ok(self)
    }

    /// Defaults to 6 per core.
    pub fn connection_thread_count(mut self, count: usize) -> Result<Self, Error> {
        at_least("connection thread count", count as u64, 1, ">= 1")?;
        self.raw.connection_thread_count = Some(count);
        Ok(self)
    }

    /// Defaults to half of the cores, rounded up.
    pub fn receiver_thread_count(mut self, count: usize) -> Result<Self, Error> {
        at_least("receiver thread count", count as u64, 1, ">= 1")?;
        self.raw.receiver_thread_count = Some(count);
        Ok(self)
    }

    /// Defaults to the OS default.
    pub fn socket_receive_buffer_size(mut self, size: usize) -> Result<Self, Error> {
        at_least("socket receive buffer size", size as u64, 1, ">= 1")?;
        self.raw.socket_receive_buffer_size = Some(size);
        Ok(self)
    }

    /// Defaults to the OS default.
    pub fn socket_send_buffer_size(mut self, size: usize) -> Result<Self, Error> {
        at_least("socket send buffer size", size as u64, 1, ">= 1")?;
        self.raw.socket_send_buffer_size = Some(size);
        Ok(self)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Set the interval of health statistics, at least one second.
    ///
    /// Defaults to no health statistics.
    pub fn health_status_interval(mut self, interval: Duration) -> Result<Self, Error> {
        duration_at_least(
            "health status interval",
            interval,
            Duration::from_secs(1),
            ">= 1s",
        )?;
        self.raw.health_status_interval = Some(interval);
        Ok(self)
    }

    pub fn health_handler(mut self, handler: Arc<dyn DtlsHealth>) -> Self {
        self.raw.health_handler = Some(handler);
        self
    }

    pub fn connection_listener(mut self, listener: Arc<dyn ConnectionListener>) -> Self {
        self.raw.connection_listener = Some(listener);
        self
    }

    // ========================================================================
    // Resumption
    // ========================================================================

    /// Resume the session before sending after this much quiet time.
    ///
    /// At least one millisecond. Defaults to never.
    pub fn auto_resumption_timeout(mut self, timeout: Duration) -> Result<Self, Error> {
        duration_at_least(
            "auto resumption timeout",
            timeout,
            Duration::from_millis(1),
            ">= 1ms",
        )?;
        self.raw.auto_resumption_timeout = Some(timeout);
        Ok(self)
    }

    /// Whether a server assigns session IDs. Defaults to true.
    ///
    /// Disabling fails for client only.
    pub fn use_server_session_id(mut self, enable: bool) -> Result<Self, Error> {
        if !enable && self.raw.client_only == Some(true) {
            return Err(conflict("disabled server session id", "client only"));
        }
        self.raw.use_server_session_id = Some(enable);
        Ok(self)
    }

    pub fn resumption_verifier(mut self, verifier: Arc<dyn ResumptionVerifier>) -> Self {
        self.raw.resumption_verifier = Some(verifier);
        self
    }

    /// Set the connection store usage in percent, above which resumptions
    /// require a HELLO_VERIFY_REQUEST.
    ///
    /// Within [0, 100], 0 to always verify. Defaults to 30.
    pub fn verify_peers_on_resumption_threshold(mut self, percent: u8) -> Result<Self, Error> {
        if self.raw.use_hello_verify_request == Some(false) {
            return Err(conflict(
                "verify peers on resumption threshold",
                "disabled HELLO_VERIFY_REQUEST",
            ));
        }
        if percent > 100 {
            return Err(OptionError::OutOfRange {
                option: "verify peers on resumption threshold",
                value: percent as u64,
                expected: "[0, 100]",
            }
            .into());
        }
        self.raw.verify_peers_on_resumption_threshold = Some(percent);
        Ok(self)
    }

    // ========================================================================
    // Anti-DoS
    // ========================================================================

    /// Whether a server verifies client addresses with HELLO_VERIFY_REQUEST.
    ///
    /// Disabling it exposes the server to amplification attacks. Defaults to true.
    pub fn use_hello_verify_request(mut self, enable: bool) -> Result<Self, Error> {
        if self.raw.client_only == Some(true) {
            return Err(conflict("HELLO_VERIFY_REQUEST", "client only"));
        }
        if !enable {
            if self.raw.use_hello_verify_request_for_psk == Some(true) {
                return Err(conflict(
                    "disabled HELLO_VERIFY_REQUEST",
                    "enabled HELLO_VERIFY_REQUEST for PSK",
                ));
            }
            if self.raw.verify_peers_on_resumption_threshold.is_some() {
                return Err(conflict(
                    "disabled HELLO_VERIFY_REQUEST",
                    "verify peers on resumption threshold",
                ));
            }
        }
        self.raw.use_hello_verify_request = Some(enable);
        Ok(self)
    }

    /// Whether PSK handshakes use HELLO_VERIFY_REQUEST as well.
    ///
    /// PSK handshakes carry small server flights, so some deployments skip the
    /// extra round trip. Disabling requires at least one PSK cipher suite.
    /// Defaults to the general HELLO_VERIFY_REQUEST setting.
    pub fn use_hello_verify_request_for_psk(mut self, enable: bool) -> Result<Self, Error> {
        if self.raw.client_only == Some(true) {
            return Err(conflict("HELLO_VERIFY_REQUEST for PSK", "client only"));
        }
        if enable && self.raw.use_hello_verify_request == Some(false) {
            return Err(conflict(
                "enabled HELLO_VERIFY_REQUEST for PSK",
                "disabled HELLO_VERIFY_REQUEST",
            ));
        }
        if !enable {
            if let Some(suites) = &self.raw.cipher_suites {
                if !contains_psk_based(suites) {
                    return Err(OptionError::NoPskCipherSuite.into());
                }
            }
        }
        self.raw.use_hello_verify_request_for_psk = Some(enable);
        Ok(self)
    }

    /// Send HELLO_VERIFY_REQUEST with a fixed version, DTLS 1.0 or DTLS 1.2.
    ///
    /// Defaults to the version the client sent.
    pub fn protocol_version_for_hello_verify_requests(
        mut self,
        version: ProtocolVersion,
    ) -> Result<Self, Error> {
        if !matches!(version, ProtocolVersion::DTLS1_0 | ProtocolVersion::DTLS1_2) {
            return Err(OptionError::UnsupportedProtocolVersion(version).into());
        }
        self.raw.protocol_version_for_hello_verify_requests = Some(version);
        Ok(self)
    }

    // ========================================================================
    // Replay and connection IDs
    // ========================================================================

    /// Whether to drop replayed records.
    ///
    /// Fails if the extended window filter is active. Defaults to true unless
    /// the extended window filter is active.
    pub fn use_anti_replay_filter(mut self, enable: bool) -> Result<Self, Error> {
        if enable && self.raw.use_extended_window_filter.is_some_and(|level| level != 0) {
            return Err(conflict("anti replay filter", "extended window filter"));
        }
        self.raw.use_anti_replay_filter = Some(enable);
        Ok(self)
    }

    /// Extend the lower receive window boundary.
    ///
    /// 0 disables the extension, -1 extends the boundary down to 0. Fails if
    /// the anti replay filter is enabled. Defaults to 0.
    pub fn use_extended_window_filter(mut self, level: i32) -> Result<Self, Error> {
        if level != 0 && self.raw.use_anti_replay_filter == Some(true) {
            return Err(conflict("extended window filter", "anti replay filter"));
        }
        self.raw.use_extended_window_filter = Some(level);
        Ok(self)
    }

    pub fn connection_id_generator(mut self, generator: Arc<dyn ConnectionIdGenerator>) -> Self {
        self.raw.connection_id_generator = Some(generator);
        self
    }

    /// Only newer CID records update the peer's address. Defaults to true.
    pub fn cid_update_address_on_newer_record_filter(mut self, enable: bool) -> Self {
        self.raw.cid_update_address_on_newer_record_filter = Some(enable);
        self
    }

    // ========================================================================
    // Extensions
    // ========================================================================

    /// Server Name Indication (RFC 6066). Defaults to false.
    pub fn sni_enabled(mut self, enable: bool) -> Self {
        self.raw.sni_enabled = Some(enable);
        self
    }

    /// Extended Master Secret (RFC 7627). Defaults to `Enabled`.
    pub fn extended_master_secret_mode(mut self, mode: ExtendedMasterSecretMode) -> Self {
        self.raw.extended_master_secret_mode = Some(mode);
        self
    }

    /// Defaults to true.
    pub fn truncate_client_certificate_path(mut self, enable: bool) -> Self {
        self.raw.truncate_client_certificate_path = Some(enable);
        self
    }

    /// Defaults to true.
    pub fn truncate_certificate_path_for_validation(mut self, enable: bool) -> Self {
        self.raw.truncate_certificate_path_for_validation = Some(enable);
        self
    }
}
