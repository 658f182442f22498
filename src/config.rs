use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use crate::builder::{ConfigBuilder, RawOptions};
use crate::capability::{
    CertificateProvider, CertificateVerifier, ConnectionIdGenerator, ConnectionListener, DtlsHealth,
    PskStore, ResumptionVerifier,
};
use crate::certificate::ConfigurationHelper;
use crate::cipher_suite::CipherSuite;
use crate::crypto::CryptoProvider;
use crate::types::{
    ExtendedMasterSecretMode, HandshakeMode, NamedGroup, ProtocolVersion, SignatureAndHashAlgorithm,
};

/// Bind address if none is set: any interface, ephemeral port.
pub const DEFAULT_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
/// Initial retransmission timeout.
pub const DEFAULT_RETRANSMISSION_TIMEOUT: Duration = Duration::from_millis(2000);
/// Additional timeout for ECC based flights.
pub const DEFAULT_ADDITIONAL_TIMEOUT_FOR_ECC: Duration = Duration::ZERO;
pub const DEFAULT_MAX_RETRANSMISSIONS: u32 = 4;
pub const DEFAULT_MAX_FRAGMENTED_HANDSHAKE_MESSAGE_LENGTH: usize = 8192;
pub const DEFAULT_OUTBOUND_MESSAGE_BUFFER_SIZE: usize = 100_000;
pub const DEFAULT_MAX_DEFERRED_OUTGOING_APPLICATION_DATA_MESSAGES: usize = 10;
pub const DEFAULT_MAX_DEFERRED_INCOMING_RECORDS_SIZE: usize = 8192;
pub const DEFAULT_MAX_CONNECTIONS: usize = 150_000;
/// Connections without traffic for this long may be evicted when the store is full.
pub const DEFAULT_STALE_CONNECTION_THRESHOLD: Duration = Duration::from_secs(30 * 60);
/// MTU limit, used when no fixed MTU is configured.
pub const DEFAULT_MAX_TRANSMISSION_UNIT_LIMIT: usize = 1500;
/// Percentage of the connection store that must be used before resumptions get verified.
pub const DEFAULT_VERIFY_PEERS_ON_RESUMPTION_THRESHOLD: u8 = 30;
/// Connection threads are this many per core.
pub const CONNECTION_THREADS_PER_CORE: usize = 6;

/// Summary of the final cipher suites, computed once while finalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// At least one PSK based suite.
    pub has_psk: bool,
    /// At least one suite where the server authenticates with a certificate.
    pub has_certificate: bool,
    /// At least one ECC based suite.
    pub has_ecc: bool,
}

impl Capabilities {
    pub(crate) fn classify(suites: &[CipherSuite]) -> Self {
        let mut capabilities = Capabilities::default();
        for suite in suites {
            if suite.is_psk_based() {
                capabilities.has_psk = true;
            } else if suite.requires_server_certificate() {
                capabilities.has_certificate = true;
            }
            if suite.is_ecc_based() {
                capabilities.has_ecc = true;
            }
        }
        capabilities
    }
}

/// Resolved DTLS connector configuration.
///
/// Created by [`ConfigBuilder::build()`], immutable afterwards. Every option is
/// resolved, unset options hold their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) logging_tag: String,
    pub(crate) address: SocketAddr,
    pub(crate) enable_address_reuse: bool,

    pub(crate) client_only: bool,
    pub(crate) server_only: bool,
    pub(crate) default_handshake_mode: HandshakeMode,
    pub(crate) client_auth_wanted: bool,
    pub(crate) client_auth_required: bool,

    pub(crate) psk_store: Option<Arc<dyn PskStore>>,
    pub(crate) certificate_identity: Option<Arc<dyn CertificateProvider>>,
    pub(crate) certificate_verifier: Option<Arc<dyn CertificateVerifier>>,
    pub(crate) certificate_helper: Option<ConfigurationHelper>,

    pub(crate) cipher_suites: Vec<CipherSuite>,
    pub(crate) preselected_cipher_suites: Option<Vec<CipherSuite>>,
    pub(crate) recommended_cipher_suites_only: bool,
    pub(crate) signature_algorithms: Vec<SignatureAndHashAlgorithm>,
    pub(crate) recommended_signature_and_hash_algorithms_only: bool,
    pub(crate) supported_groups: Vec<NamedGroup>,
    pub(crate) recommended_supported_groups_only: bool,

    pub(crate) retransmission_timeout: Duration,
    pub(crate) additional_timeout_for_ecc: Duration,
    pub(crate) max_retransmissions: u32,
    pub(crate) backoff_retransmission: u32,
    pub(crate) early_stop_retransmission: bool,

    pub(crate) max_transmission_unit: Option<usize>,
    pub(crate) max_transmission_unit_limit: Option<usize>,
    pub(crate) max_fragment_length_code: Option<u8>,
    pub(crate) record_size_limit: Option<u16>,
    pub(crate) max_fragmented_handshake_message_length: usize,
    pub(crate) enable_multi_record_messages: bool,
    pub(crate) enable_multi_handshake_message_records: bool,

    pub(crate) outbound_message_buffer_size: usize,
    pub(crate) max_deferred_outgoing_application_data_messages: usize,
    pub(crate) max_deferred_incoming_records_size: usize,
    pub(crate) max_connections: usize,
    pub(crate) stale_connection_threshold: Duration,
    pub(crate) connection_thread_count: usize,
    pub(crate) receiver_thread_count: usize,
    pub(crate) socket_receive_buffer_size: Option<usize>,
    pub(crate) socket_send_buffer_size: Option<usize>,

    pub(crate) health_status_interval: Option<Duration>,
    pub(crate) health_handler: Option<Arc<dyn DtlsHealth>>,
    pub(crate) connection_listener: Option<Arc<dyn ConnectionListener>>,

    pub(crate) auto_resumption_timeout: Option<Duration>,
    pub(crate) use_server_session_id: bool,
    pub(crate) resumption_verifier: Option<Arc<dyn ResumptionVerifier>>,
    pub(crate) verify_peers_on_resumption_threshold: u8,

    pub(crate) use_hello_verify_request: bool,
    pub(crate) use_hello_verify_request_for_psk: bool,
    pub(crate) protocol_version_for_hello_verify_requests: Option<ProtocolVersion>,

    pub(crate) use_anti_replay_filter: bool,
    pub(crate) use_extended_window_filter: i32,
    pub(crate) connection_id_generator: Option<Arc<dyn ConnectionIdGenerator>>,
    pub(crate) cid_update_address_on_newer_record_filter: bool,

    pub(crate) sni_enabled: bool,
    pub(crate) extended_master_secret_mode: ExtendedMasterSecretMode,
    pub(crate) truncate_client_certificate_path: bool,
    pub(crate) truncate_certificate_path_for_validation: bool,

    pub(crate) capabilities: Capabilities,
    pub(crate) crypto_provider: CryptoProvider,
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Seed a new builder with this configuration (copy-then-edit).
    ///
    /// Building the returned builder unchanged yields a configuration equal
    /// to this one. Options that only exist as defaults for the role are
    /// left unset, so they may still be changed.
    pub fn to_builder(&self) -> ConfigBuilder {
        let server_capable = !self.client_only;
        let raw = RawOptions {
            logging_tag: Some(self.logging_tag.clone()),
            address: Some(self.address),
            enable_address_reuse: Some(self.enable_address_reuse),

            client_only: Some(self.client_only),
            server_only: Some(self.server_only),
            default_handshake_mode: Some(self.default_handshake_mode),
            client_auth_wanted: server_capable.then_some(self.client_auth_wanted),
            // A requirement that only exists by default stays a default, see `finalize`.
            client_auth_required: (server_capable
                && (!self.client_auth_required || self.certificate_verifier.is_some()))
            .then_some(self.client_auth_required),

            psk_store: self.psk_store.clone(),
            certificate_identity: self.certificate_identity.clone(),
            certificate_verifier: self.certificate_verifier.clone(),

            cipher_suites: Some(self.cipher_suites.clone()),
            preselected_cipher_suites: self.preselected_cipher_suites.clone(),
            recommended_cipher_suites_only: Some(self.recommended_cipher_suites_only),
            // Empty when no ECC based suite is used, which must stay unset.
            signature_algorithms: (!self.signature_algorithms.is_empty())
                .then(|| self.signature_algorithms.clone()),
            recommended_signature_and_hash_algorithms_only: Some(
                self.recommended_signature_and_hash_algorithms_only,
            ),
            supported_groups: (!self.supported_groups.is_empty())
                .then(|| self.supported_groups.clone()),
            recommended_supported_groups_only: Some(self.recommended_supported_groups_only),

            retransmission_timeout: Some(self.retransmission_timeout),
            additional_timeout_for_ecc: Some(self.additional_timeout_for_ecc),
            max_retransmissions: Some(self.max_retransmissions),
            backoff_retransmission: Some(self.backoff_retransmission),
            early_stop_retransmission: Some(self.early_stop_retransmission),

            max_transmission_unit: self.max_transmission_unit,
            max_transmission_unit_limit: self.max_transmission_unit_limit,
            max_fragment_length_code: self.max_fragment_length_code,
            record_size_limit: self.record_size_limit,
            max_fragmented_handshake_message_length: Some(
                self.max_fragmented_handshake_message_length,
            ),
            enable_multi_record_messages: Some(self.enable_multi_record_messages),
            enable_multi_handshake_message_records: Some(
                self.enable_multi_handshake_message_records,
            ),

            outbound_message_buffer_size: Some(self.outbound_message_buffer_size),
            max_deferred_outgoing_application_data_messages: Some(
                self.max_deferred_outgoing_application_data_messages,
            ),
            max_deferred_incoming_records_size: Some(self.max_deferred_incoming_records_size),
            max_connections: Some(self.max_connections),
            stale_connection_threshold: Some(self.stale_connection_threshold),
            connection_thread_count: Some(self.connection_thread_count),
            receiver_thread_count: Some(self.receiver_thread_count),
            socket_receive_buffer_size: self.socket_receive_buffer_size,
            socket_send_buffer_size: self.socket_send_buffer_size,

            health_status_interval: self.health_status_interval,
            health_handler: self.health_handler.clone(),
            connection_listener: self.connection_listener.clone(),

            auto_resumption_timeout: self.auto_resumption_timeout,
            use_server_session_id: server_capable.then_some(self.use_server_session_id),
            resumption_verifier: self.resumption_verifier.clone(),
            verify_peers_on_resumption_threshold: (server_capable
                && self.use_hello_verify_request)
                .then_some(self.verify_peers_on_resumption_threshold),

            use_hello_verify_request: server_capable.then_some(self.use_hello_verify_request),
            use_hello_verify_request_for_psk: server_capable
                .then_some(self.use_hello_verify_request_for_psk),
            protocol_version_for_hello_verify_requests: self
                .protocol_version_for_hello_verify_requests,

            use_anti_replay_filter: Some(self.use_anti_replay_filter),
            use_extended_window_filter: Some(self.use_extended_window_filter),
            connection_id_generator: self.connection_id_generator.clone(),
            cid_update_address_on_newer_record_filter: Some(
                self.cid_update_address_on_newer_record_filter,
            ),

            sni_enabled: Some(self.sni_enabled),
            extended_master_secret_mode: Some(self.extended_master_secret_mode),
            truncate_client_certificate_path: Some(self.truncate_client_certificate_path),
            truncate_certificate_path_for_validation: Some(
                self.truncate_certificate_path_for_validation,
            ),
        };
        ConfigBuilder::from_raw(raw)
    }

    /// Logging tag, empty or ending with a space.
    #[inline(always)]
    pub fn logging_tag(&self) -> &str {
        &self.logging_tag
    }

    /// Local address to bind to.
    #[inline(always)]
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Whether the socket is bound with address reuse.
    #[inline(always)]
    pub fn enable_address_reuse(&self) -> bool {
        self.enable_address_reuse
    }

    /// The connector only acts as client.
    ///
    /// Peers can't start handshakes with it.
    #[inline(always)]
    pub fn client_only(&self) -> bool {
        self.client_only
    }

    /// The connector only acts as server.
    #[inline(always)]
    pub fn server_only(&self) -> bool {
        self.server_only
    }

    /// Whether sending application data to a peer without a session starts a handshake.
    #[inline(always)]
    pub fn default_handshake_mode(&self) -> HandshakeMode {
        self.default_handshake_mode
    }

    /// For a server, ask clients for a certificate, but accept them without one.
    #[inline(always)]
    pub fn client_auth_wanted(&self) -> bool {
        self.client_auth_wanted
    }

    /// For a server, require a client certificate.
    ///
    /// The server sends a CertificateRequest and fails the handshake if the
    /// client does not send a certificate.
    #[inline(always)]
    pub fn client_auth_required(&self) -> bool {
        self.client_auth_required
    }

    #[inline(always)]
    pub fn psk_store(&self) -> Option<&Arc<dyn PskStore>> {
        self.psk_store.as_ref()
    }

    #[inline(always)]
    pub fn certificate_identity(&self) -> Option<&Arc<dyn CertificateProvider>> {
        self.certificate_identity.as_ref()
    }

    #[inline(always)]
    pub fn certificate_verifier(&self) -> Option<&Arc<dyn CertificateVerifier>> {
        self.certificate_verifier.as_ref()
    }

    /// What the certificate material of identity and verifier requires.
    ///
    /// `None` if neither supplies [`ConfigurationDefaults`](crate::capability::ConfigurationDefaults).
    #[inline(always)]
    pub fn certificate_helper(&self) -> Option<&ConfigurationHelper> {
        self.certificate_helper.as_ref()
    }

    /// Cipher suites in order of preference.
    #[inline(always)]
    pub fn cipher_suites(&self) -> &[CipherSuite] {
        &self.cipher_suites
    }

    #[inline(always)]
    pub fn preselected_cipher_suites(&self) -> Option<&[CipherSuite]> {
        self.preselected_cipher_suites.as_deref()
    }

    #[inline(always)]
    pub fn recommended_cipher_suites_only(&self) -> bool {
        self.recommended_cipher_suites_only
    }

    /// Signature and hash algorithms in order of preference.
    ///
    /// Empty if no ECC based cipher suite is used.
    #[inline(always)]
    pub fn signature_algorithms(&self) -> &[SignatureAndHashAlgorithm] {
        &self.signature_algorithms
    }

    #[inline(always)]
    pub fn recommended_signature_and_hash_algorithms_only(&self) -> bool {
        self.recommended_signature_and_hash_algorithms_only
    }

    /// Groups (curves) in order of preference.
    ///
    /// Empty if no ECC based cipher suite is used.
    #[inline(always)]
    pub fn supported_groups(&self) -> &[NamedGroup] {
        &self.supported_groups
    }

    #[inline(always)]
    pub fn recommended_supported_groups_only(&self) -> bool {
        self.recommended_supported_groups_only
    }

    /// Time before the first retransmission of a flight.
    #[inline(always)]
    pub fn retransmission_timeout(&self) -> Duration {
        self.retransmission_timeout
    }

    /// Added to the retransmission timeout of flights with ECC operations.
    #[inline(always)]
    pub fn additional_timeout_for_ecc(&self) -> Duration {
        self.additional_timeout_for_ecc
    }

    /// Max number of retransmissions per flight.
    #[inline(always)]
    pub fn max_retransmissions(&self) -> u32 {
        self.max_retransmissions
    }

    /// Retransmissions after which flights are sent one record per datagram.
    #[inline(always)]
    pub fn backoff_retransmission(&self) -> u32 {
        self.backoff_retransmission
    }

    /// Stop retransmitting a flight as soon as the peer's response starts arriving.
    #[inline(always)]
    pub fn early_stop_retransmission(&self) -> bool {
        self.early_stop_retransmission
    }

    /// Fixed max transmission unit, `None` if it's detected from the network interface.
    #[inline(always)]
    pub fn max_transmission_unit(&self) -> Option<usize> {
        self.max_transmission_unit
    }

    /// Upper bound for the detected MTU. `None` when the MTU is fixed.
    #[inline(always)]
    pub fn max_transmission_unit_limit(&self) -> Option<usize> {
        self.max_transmission_unit_limit
    }

    /// Max fragment length code (RFC 6066), `None` if not negotiated.
    #[inline(always)]
    pub fn max_fragment_length_code(&self) -> Option<u8> {
        self.max_fragment_length_code
    }

    /// Record size limit (RFC 8449), `None` if not negotiated.
    #[inline(always)]
    pub fn record_size_limit(&self) -> Option<u16> {
        self.record_size_limit
    }

    #[inline(always)]
    pub fn max_fragmented_handshake_message_length(&self) -> usize {
        self.max_fragmented_handshake_message_length
    }

    /// Pack multiple records into one datagram.
    #[inline(always)]
    pub fn enable_multi_record_messages(&self) -> bool {
        self.enable_multi_record_messages
    }

    /// Pack multiple handshake messages into one record.
    #[inline(always)]
    pub fn enable_multi_handshake_message_records(&self) -> bool {
        self.enable_multi_handshake_message_records
    }

    #[inline(always)]
    pub fn outbound_message_buffer_size(&self) -> usize {
        self.outbound_message_buffer_size
    }

    /// Application data messages buffered while a handshake is in progress.
    #[inline(always)]
    pub fn max_deferred_outgoing_application_data_messages(&self) -> usize {
        self.max_deferred_outgoing_application_data_messages
    }

    /// Bytes of incoming records buffered while a handshake is in progress.
    #[inline(always)]
    pub fn max_deferred_incoming_records_size(&self) -> usize {
        self.max_deferred_incoming_records_size
    }

    #[inline(always)]
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    #[inline(always)]
    pub fn stale_connection_threshold(&self) -> Duration {
        self.stale_connection_threshold
    }

    #[inline(always)]
    pub fn connection_thread_count(&self) -> usize {
        self.connection_thread_count
    }

    #[inline(always)]
    pub fn receiver_thread_count(&self) -> usize {
        self.receiver_thread_count
    }

    /// Socket receive buffer size, `None` for the OS default.
    #[inline(always)]
    pub fn socket_receive_buffer_size(&self) -> Option<usize> {
        self.socket_receive_buffer_size
    }

    /// Socket send buffer size, `None` for the OS default.
    #[inline(always)]
    pub fn socket_send_buffer_size(&self) -> Option<usize> {
        self.socket_send_buffer_size
    }

    /// Interval of health statistics, `None` if disabled.
    #[inline(always)]
    pub fn health_status_interval(&self) -> Option<Duration> {
        self.health_status_interval
    }

    #[inline(always)]
    pub fn health_handler(&self) -> Option<&Arc<dyn DtlsHealth>> {
        self.health_handler.as_ref()
    }

    #[inline(always)]
    pub fn connection_listener(&self) -> Option<&Arc<dyn ConnectionListener>> {
        self.connection_listener.as_ref()
    }

    /// Quiet time after which a client resumes the session before sending, `None` to never.
    #[inline(always)]
    pub fn auto_resumption_timeout(&self) -> Option<Duration> {
        self.auto_resumption_timeout
    }

    /// Whether a server assigns session IDs, which enables resumption.
    #[inline(always)]
    pub fn use_server_session_id(&self) -> bool {
        self.use_server_session_id
    }

    #[inline(always)]
    pub fn resumption_verifier(&self) -> Option<&Arc<dyn ResumptionVerifier>> {
        self.resumption_verifier.as_ref()
    }

    /// Connection store usage in percent above which resumptions require a HELLO_VERIFY_REQUEST.
    ///
    /// 0 when HELLO_VERIFY_REQUEST is disabled.
    #[inline(always)]
    pub fn verify_peers_on_resumption_threshold(&self) -> u8 {
        self.verify_peers_on_resumption_threshold
    }

    /// Whether a server verifies client addresses with HELLO_VERIFY_REQUEST (RFC 6347, 4.2.1).
    #[inline(always)]
    pub fn use_hello_verify_request(&self) -> bool {
        self.use_hello_verify_request
    }

    /// Whether HELLO_VERIFY_REQUEST is also used for PSK handshakes.
    #[inline(always)]
    pub fn use_hello_verify_request_for_psk(&self) -> bool {
        self.use_hello_verify_request_for_psk
    }

    /// Fixed version for HELLO_VERIFY_REQUEST, `None` to echo the client's version.
    #[inline(always)]
    pub fn protocol_version_for_hello_verify_requests(&self) -> Option<ProtocolVersion> {
        self.protocol_version_for_hello_verify_requests
    }

    /// Drop records already seen or left of the receive window (RFC 6347, 4.1.2.6).
    #[inline(always)]
    pub fn use_anti_replay_filter(&self) -> bool {
        self.use_anti_replay_filter
    }

    /// Extension of the lower receive window boundary.
    ///
    /// 0 disables the extended filter, -1 extends the boundary down to 0.
    #[inline(always)]
    pub fn use_extended_window_filter(&self) -> i32 {
        self.use_extended_window_filter
    }

    #[inline(always)]
    pub fn connection_id_generator(&self) -> Option<&Arc<dyn ConnectionIdGenerator>> {
        self.connection_id_generator.as_ref()
    }

    /// Only newer CID records update the peer's address.
    #[inline(always)]
    pub fn cid_update_address_on_newer_record_filter(&self) -> bool {
        self.cid_update_address_on_newer_record_filter
    }

    /// Server Name Indication (RFC 6066).
    #[inline(always)]
    pub fn sni_enabled(&self) -> bool {
        self.sni_enabled
    }

    /// Extended Master Secret (RFC 7627).
    #[inline(always)]
    pub fn extended_master_secret_mode(&self) -> ExtendedMasterSecretMode {
        self.extended_master_secret_mode
    }

    /// Truncate the client's certificate path to what the server trusts.
    #[inline(always)]
    pub fn truncate_client_certificate_path(&self) -> bool {
        self.truncate_client_certificate_path
    }

    /// Truncate received certificate paths at the first trusted certificate.
    #[inline(always)]
    pub fn truncate_certificate_path_for_validation(&self) -> bool {
        self.truncate_certificate_path_for_validation
    }

    /// PSK, certificate and ECC usage of the cipher suites.
    #[inline(always)]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Crypto provider the configuration was validated against.
    #[inline(always)]
    pub fn crypto_provider(&self) -> &CryptoProvider {
        &self.crypto_provider
    }
}

/// Compare capability handles by identity.
fn same_handle<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::as_ptr(a) as *const u8 == Arc::as_ptr(b) as *const u8,
        _ => false,
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.logging_tag == other.logging_tag
            && self.address == other.address
            && self.enable_address_reuse == other.enable_address_reuse
            && self.client_only == other.client_only
            && self.server_only == other.server_only
            && self.default_handshake_mode == other.default_handshake_mode
            && self.client_auth_wanted == other.client_auth_wanted
            && self.client_auth_required == other.client_auth_required
            && same_handle(&self.psk_store, &other.psk_store)
            && same_handle(&self.certificate_identity, &other.certificate_identity)
            && same_handle(&self.certificate_verifier, &other.certificate_verifier)
            && self.certificate_helper == other.certificate_helper
            && self.cipher_suites == other.cipher_suites
            && self.preselected_cipher_suites == other.preselected_cipher_suites
            && self.recommended_cipher_suites_only == other.recommended_cipher_suites_only
            && self.signature_algorithms == other.signature_algorithms
            && self.recommended_signature_and_hash_algorithms_only
                == other.recommended_signature_and_hash_algorithms_only
            && self.supported_groups == other.supported_groups
            && self.recommended_supported_groups_only == other.recommended_supported_groups_only
            && self.retransmission_timeout == other.retransmission_timeout
            && self.additional_timeout_for_ecc == other.additional_timeout_for_ecc
            && self.max_retransmissions == other.max_retransmissions
            && self.backoff_retransmission == other.backoff_retransmission
            && self.early_stop_retransmission == other.early_stop_retransmission
            && self.max_transmission_unit == other.max_transmission_unit
            && self.max_transmission_unit_limit == other.max_transmission_unit_limit
            && self.max_fragment_length_code == other.max_fragment_length_code
            && self.record_size_limit == other.record_size_limit
            && self.max_fragmented_handshake_message_length
                == other.max_fragmented_handshake_message_length
            && self.enable_multi_record_messages == other.enable_multi_record_messages
            && self.enable_multi_handshake_message_records
                == other.enable_multi_handshake_message_records
            && self.outbound_message_buffer_size == other.outbound_message_buffer_size
            && self.max_deferred_outgoing_application_data_messages
                == other.max_deferred_outgoing_application_data_messages
            && self.max_deferred_incoming_records_size == other.max_deferred_incoming_records_size
            && self.max_connections == other.max_connections
            && self.stale_connection_threshold == other.stale_connection_threshold
            && self.connection_thread_count == other.connection_thread_count
            && self.receiver_thread_count == other.receiver_thread_count
            && self.socket_receive_buffer_size == other.socket_receive_buffer_size
            && self.socket_send_buffer_size == other.socket_send_buffer_size
            && self.health_status_interval == other.health_status_interval
            && same_handle(&self.health_handler, &other.health_handler)
            && same_handle(&self.connection_listener, &other.connection_listener)
            && self.auto_resumption_timeout == other.auto_resumption_timeout
            && self.use_server_session_id == other.use_server_session_id
            && same_handle(&self.resumption_verifier, &other.resumption_verifier)
            && self.verify_peers_on_resumption_threshold
                == other.verify_peers_on_resumption_threshold
            && self.use_hello_verify_request == other.use_hello_verify_request
            && self.use_hello_verify_request_for_psk == other.use_hello_verify_request_for_psk
            && self.protocol_version_for_hello_verify_requests
                == other.protocol_version_for_hello_verify_requests
            && self.use_anti_replay_filter == other.use_anti_replay_filter
            && self.use_extended_window_filter == other.use_extended_window_filter
            && same_handle(&self.connection_id_generator, &other.connection_id_generator)
            && self.cid_update_address_on_newer_record_filter
                == other.cid_update_address_on_newer_record_filter
            && self.sni_enabled == other.sni_enabled
            && self.extended_master_secret_mode == other.extended_master_secret_mode
            && self.truncate_client_certificate_path == other.truncate_client_certificate_path
            && self.truncate_certificate_path_for_validation
                == other.truncate_certificate_path_for_validation
            && self.capabilities == other.capabilities
            && self.crypto_provider == other.crypto_provider
    }
}
