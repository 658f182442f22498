//! Turn collected options into a resolved [`Config`].
//!
//! Finalizing fills unset options with defaults, derives cipher suites,
//! signature algorithms and groups from the credentials, and enforces every
//! rule that spans more than one option.

use crate::builder::{not_recommended, RawOptions};
use crate::capability::{CertificateProvider, CertificateVerifier};
use crate::certificate::ConfigurationHelper;
use crate::cipher_suite::{CertificateKeyAlgorithm, CipherSuite, KeyExchangeAlgorithm};
use crate::config::{
    Capabilities, Config, CONNECTION_THREADS_PER_CORE, DEFAULT_ADDITIONAL_TIMEOUT_FOR_ECC,
    DEFAULT_ADDRESS, DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_DEFERRED_INCOMING_RECORDS_SIZE,
    DEFAULT_MAX_DEFERRED_OUTGOING_APPLICATION_DATA_MESSAGES,
    DEFAULT_MAX_FRAGMENTED_HANDSHAKE_MESSAGE_LENGTH, DEFAULT_MAX_RETRANSMISSIONS,
    DEFAULT_MAX_TRANSMISSION_UNIT_LIMIT, DEFAULT_OUTBOUND_MESSAGE_BUFFER_SIZE,
    DEFAULT_RETRANSMISSION_TIMEOUT, DEFAULT_STALE_CONNECTION_THRESHOLD,
    DEFAULT_VERIFY_PEERS_ON_RESUMPTION_THRESHOLD,
};
use crate::crypto::CryptoProvider;
use crate::error::{ConsistencyError, Role};
use crate::platform::Platform;
use crate::types::{
    CertificateType, ExtendedMasterSecretMode, HandshakeMode, NamedGroup, SignatureAndHashAlgorithm,
};
use crate::Error;

/// Resolve the options into a configuration for the given platform.
///
/// Runs once, after all options are set. Either every rule holds and the
/// returned configuration has all options resolved, or the first violation
/// is reported.
pub fn finalize(raw: RawOptions, platform: &Platform) -> Result<Config, Error> {
    let provider = platform.crypto_provider();
    provider.validate()?;

    let tag = normalize_logging_tag(raw.logging_tag.as_deref());

    let client_only = raw.client_only.unwrap_or(false);
    let server_only = raw.server_only.unwrap_or(false);
    check_roles(&raw, client_only, server_only)?;

    let client_auth_wanted = raw.client_auth_wanted.unwrap_or(false);
    let client_auth_required = raw
        .client_auth_required
        .unwrap_or(!client_only && !client_auth_wanted);
    let default_handshake_mode = raw.default_handshake_mode.unwrap_or(if server_only {
        HandshakeMode::None
    } else {
        HandshakeMode::Auto
    });

    if server_only
        && !client_auth_wanted
        && !client_auth_required
        && raw.certificate_verifier.is_some()
    {
        return Err(ConsistencyError::VerifierWithoutClientAuthentication.into());
    }

    let recommended_cipher_suites_only = raw.recommended_cipher_suites_only.unwrap_or(true);
    let recommended_signatures_only = raw
        .recommended_signature_and_hash_algorithms_only
        .unwrap_or(true);
    let recommended_groups_only = raw.recommended_supported_groups_only.unwrap_or(true);

    let helper = configuration_helper(
        raw.certificate_identity.as_deref(),
        raw.certificate_verifier.as_deref(),
    );

    // Cipher suites
    let cipher_suites = match &raw.cipher_suites {
        Some(explicit) => {
            check_explicit_cipher_suites(explicit, recommended_cipher_suites_only, provider)?;
            explicit.clone()
        }
        None => derive_cipher_suites(
            &raw,
            helper.as_ref(),
            client_only,
            recommended_cipher_suites_only,
            provider,
            &tag,
        ),
    };
    if cipher_suites.is_empty() {
        return Err(ConsistencyError::NoCipherSuites.into());
    }

    let capabilities = Capabilities::classify(&cipher_suites);
    if !capabilities.has_psk && !capabilities.has_certificate && !client_only {
        return Err(ConsistencyError::NoCredentials.into());
    }

    let client_auth_by_default = raw.client_auth_required.is_none() && client_auth_required;
    check_credentials(
        &raw,
        &cipher_suites,
        helper.as_ref(),
        client_only,
        client_auth_wanted || (client_auth_required && !client_auth_by_default),
        &tag,
    )?;

    if raw.psk_store.is_some() && !capabilities.has_psk {
        return Err(ConsistencyError::UnusedPskStore.into());
    }

    // Signature algorithms and groups
    let (signature_algorithms, supported_groups) = if capabilities.has_ecc {
        let signatures = resolve_signature_algorithms(
            raw.signature_algorithms.as_deref(),
            helper.as_ref(),
            recommended_signatures_only,
            provider,
            &tag,
        )?;
        let groups = resolve_supported_groups(
            raw.supported_groups.as_deref(),
            helper.as_ref(),
            recommended_groups_only,
            provider,
            &tag,
        )?;
        (signatures, groups)
    } else {
        if raw.signature_algorithms.is_some() {
            return Err(ConsistencyError::SignatureAlgorithmsWithoutEcc.into());
        }
        if raw.supported_groups.is_some() {
            return Err(ConsistencyError::SupportedGroupsWithoutEcc.into());
        }
        (Vec::new(), Vec::new())
    };

    if !capabilities.has_certificate {
        if raw.certificate_identity.is_some() {
            return Err(ConsistencyError::UnusedCertificateIdentity.into());
        }
        if raw.certificate_verifier.is_some() {
            return Err(ConsistencyError::UnusedCertificateVerifier.into());
        }
    }

    if let Some(helper) = &helper {
        helper.verify_signature_algorithms(&signature_algorithms)?;
        helper.verify_supported_groups(&supported_groups)?;
    }

    check_key_usage(
        raw.certificate_identity.as_deref(),
        helper.as_ref(),
        client_only,
        server_only,
    )?;

    // Anti-DoS
    let use_hello_verify_request = raw.use_hello_verify_request.unwrap_or(true);
    if !use_hello_verify_request {
        if raw.use_hello_verify_request_for_psk == Some(true) {
            return Err(ConsistencyError::HelloVerifyRequestForPskEnabled.into());
        }
        if raw.verify_peers_on_resumption_threshold.is_some() {
            return Err(ConsistencyError::ResumptionThresholdWithoutHelloVerifyRequest.into());
        }
    }
    let use_hello_verify_request_for_psk = raw
        .use_hello_verify_request_for_psk
        .unwrap_or(use_hello_verify_request);
    if use_hello_verify_request && !use_hello_verify_request_for_psk && !capabilities.has_psk {
        return Err(ConsistencyError::HelloVerifyRequestForPskWithoutPskSuite.into());
    }
    let verify_peers_on_resumption_threshold = if use_hello_verify_request {
        raw.verify_peers_on_resumption_threshold
            .unwrap_or(DEFAULT_VERIFY_PEERS_ON_RESUMPTION_THRESHOLD)
    } else {
        0
    };

    // Replay filters
    let use_extended_window_filter = raw.use_extended_window_filter.unwrap_or(0);
    let use_anti_replay_filter = raw
        .use_anti_replay_filter
        .unwrap_or(use_extended_window_filter == 0);
    if use_anti_replay_filter && use_extended_window_filter != 0 {
        return Err(ConsistencyError::AntiReplayWithExtendedWindow.into());
    }

    // Resources
    let max_retransmissions = raw.max_retransmissions.unwrap_or(DEFAULT_MAX_RETRANSMISSIONS);
    let backoff_retransmission = raw
        .backoff_retransmission
        .unwrap_or(max_retransmissions / 2);

    let max_transmission_unit_limit = match raw.max_transmission_unit {
        Some(_) => None,
        None => Some(
            raw.max_transmission_unit_limit
                .unwrap_or(DEFAULT_MAX_TRANSMISSION_UNIT_LIMIT),
        ),
    };

    let cores = platform.available_parallelism();
    let connection_thread_count = raw
        .connection_thread_count
        .unwrap_or(CONNECTION_THREADS_PER_CORE * cores);
    let receiver_thread_count = raw.receiver_thread_count.unwrap_or((cores + 1) / 2);

    debug!(
        "{}cipher suites: {} (psk: {}, certificate: {}, ecc: {})",
        tag,
        join(cipher_suites.iter()),
        capabilities.has_psk,
        capabilities.has_certificate,
        capabilities.has_ecc
    );
    if let Some(cert) = helper.as_ref().and_then(|h| h.identity_certificate()) {
        debug!("{}identity certificate {}", tag, cert.fingerprint_str());
    }
    if capabilities.has_ecc {
        debug!(
            "{}signature algorithms: {}, groups: {}",
            tag,
            join(signature_algorithms.iter()),
            join(supported_groups.iter())
        );
    }
    trace!(
        "{}{} connection threads, {} receiver threads for {} cores",
        tag,
        connection_thread_count,
        receiver_thread_count,
        cores
    );

    Ok(Config {
        logging_tag: tag,
        address: raw.address.unwrap_or(DEFAULT_ADDRESS),
        enable_address_reuse: raw.enable_address_reuse.unwrap_or(false),

        client_only,
        server_only,
        default_handshake_mode,
        client_auth_wanted,
        client_auth_required,

        psk_store: raw.psk_store,
        certificate_identity: raw.certificate_identity,
        certificate_verifier: raw.certificate_verifier,
        certificate_helper: helper,

        cipher_suites,
        preselected_cipher_suites: raw.preselected_cipher_suites,
        recommended_cipher_suites_only,
        signature_algorithms,
        recommended_signature_and_hash_algorithms_only: recommended_signatures_only,
        supported_groups,
        recommended_supported_groups_only: recommended_groups_only,

        retransmission_timeout: raw
            .retransmission_timeout
            .unwrap_or(DEFAULT_RETRANSMISSION_TIMEOUT),
        additional_timeout_for_ecc: raw
            .additional_timeout_for_ecc
            .unwrap_or(DEFAULT_ADDITIONAL_TIMEOUT_FOR_ECC),
        max_retransmissions,
        backoff_retransmission,
        early_stop_retransmission: raw.early_stop_retransmission.unwrap_or(true),

        max_transmission_unit: raw.max_transmission_unit,
        max_transmission_unit_limit,
        max_fragment_length_code: raw.max_fragment_length_code,
        record_size_limit: raw.record_size_limit,
        max_fragmented_handshake_message_length: raw
            .max_fragmented_handshake_message_length
            .unwrap_or(DEFAULT_MAX_FRAGMENTED_HANDSHAKE_MESSAGE_LENGTH),
        enable_multi_record_messages: raw.enable_multi_record_messages.unwrap_or(true),
        enable_multi_handshake_message_records: raw
            .enable_multi_handshake_message_records
            .unwrap_or(false),

        outbound_message_buffer_size: raw
            .outbound_message_buffer_size
            .unwrap_or(DEFAULT_OUTBOUND_MESSAGE_BUFFER_SIZE),
        max_deferred_outgoing_application_data_messages: raw
            .max_deferred_outgoing_application_data_messages
            .unwrap_or(DEFAULT_MAX_DEFERRED_OUTGOING_APPLICATION_DATA_MESSAGES),
        max_deferred_incoming_records_size: raw
            .max_deferred_incoming_records_size
            .unwrap_or(DEFAULT_MAX_DEFERRED_INCOMING_RECORDS_SIZE),
        max_connections: raw.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
        stale_connection_threshold: raw
            .stale_connection_threshold
            .unwrap_or(DEFAULT_STALE_CONNECTION_THRESHOLD),
        connection_thread_count,
        receiver_thread_count,
        socket_receive_buffer_size: raw.socket_receive_buffer_size,
        socket_send_buffer_size: raw.socket_send_buffer_size,

        health_status_interval: raw.health_status_interval,
        health_handler: raw.health_handler,
        connection_listener: raw.connection_listener,

        auto_resumption_timeout: raw.auto_resumption_timeout,
        use_server_session_id: raw.use_server_session_id.unwrap_or(true),
        resumption_verifier: raw.resumption_verifier,
        verify_peers_on_resumption_threshold,

        use_hello_verify_request,
        use_hello_verify_request_for_psk,
        protocol_version_for_hello_verify_requests: raw.protocol_version_for_hello_verify_requests,

        use_anti_replay_filter,
        use_extended_window_filter,
        connection_id_generator: raw.connection_id_generator,
        cid_update_address_on_newer_record_filter: raw
            .cid_update_address_on_newer_record_filter
            .unwrap_or(true),

        sni_enabled: raw.sni_enabled.unwrap_or(false),
        extended_master_secret_mode: raw
            .extended_master_secret_mode
            .unwrap_or(ExtendedMasterSecretMode::Enabled),
        truncate_client_certificate_path: raw.truncate_client_certificate_path.unwrap_or(true),
        truncate_certificate_path_for_validation: raw
            .truncate_certificate_path_for_validation
            .unwrap_or(true),

        capabilities,
        crypto_provider: provider.clone(),
    })
}

/// Empty, or the tag followed by a single space.
fn normalize_logging_tag(tag: Option<&str>) -> String {
    match tag {
        None | Some("") => String::new(),
        Some(tag) if tag.ends_with(' ') => tag.to_string(),
        Some(tag) => format!("{} ", tag),
    }
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

fn check_roles(raw: &RawOptions, client_only: bool, server_only: bool) -> Result<(), Error> {
    if client_only && server_only {
        return Err(Error::from(ConsistencyError::ClientAndServerOnly));
    }

    if client_only {
        let server_options = [
            ("client authentication wanted", raw.client_auth_wanted.is_some()),
            ("client authentication required", raw.client_auth_required.is_some()),
            ("disabled server session id", raw.use_server_session_id == Some(false)),
            ("disabled HELLO_VERIFY_REQUEST", raw.use_hello_verify_request == Some(false)),
            (
                "disabled HELLO_VERIFY_REQUEST for PSK",
                raw.use_hello_verify_request_for_psk == Some(false),
            ),
        ];
        if let Some((option, _)) = server_options.iter().find(|(_, set)| *set) {
            return Err(ConsistencyError::RoleExclusiveOption {
                option: *option,
                role: Role::Server,
            }
            .into());
        }
    }

    if server_only && raw.default_handshake_mode == Some(HandshakeMode::Auto) {
        return Err(Error::from(ConsistencyError::HandshakeModeForServerOnly));
    }

    Ok(())
}

/// Let identity and verifier register their needs, if they can.
fn configuration_helper(
    identity: Option<&dyn CertificateProvider>,
    verifier: Option<&dyn CertificateVerifier>,
) -> Option<ConfigurationHelper> {
    let identity_defaults = identity.and_then(|i| i.configuration_defaults());
    let verifier_defaults = verifier.and_then(|v| v.configuration_defaults());
    if identity_defaults.is_none() && verifier_defaults.is_none() {
        return None;
    }

    let mut helper = ConfigurationHelper::new();
    if let Some(defaults) = identity_defaults {
        defaults.setup_configuration_helper(&mut helper);
    }
    if let Some(defaults) = verifier_defaults {
        defaults.setup_configuration_helper(&mut helper);
    }
    Some(helper)
}

/// Key algorithms the identity can authenticate with, if it tells.
fn identity_key_algorithms(
    identity: Option<&dyn CertificateProvider>,
    helper: Option<&ConfigurationHelper>,
) -> Option<Vec<CertificateKeyAlgorithm>> {
    let identity = identity?;
    identity.configuration_defaults()?;
    helper.map(ConfigurationHelper::supported_key_algorithms)
}

fn derive_cipher_suites(
    raw: &RawOptions,
    helper: Option<&ConfigurationHelper>,
    client_only: bool,
    recommended_only: bool,
    provider: &CryptoProvider,
    tag: &str,
) -> Vec<CipherSuite> {
    let mut suites: Vec<CipherSuite> = Vec::new();

    if raw.certificate_identity.is_some() || raw.certificate_verifier.is_some() {
        let key_algorithms = identity_key_algorithms(raw.certificate_identity.as_deref(), helper)
            .filter(|algorithms| !algorithms.is_empty())
            .unwrap_or_else(|| vec![CertificateKeyAlgorithm::Ec]);
        for algorithm in [CertificateKeyAlgorithm::Ec, CertificateKeyAlgorithm::Rsa] {
            if key_algorithms.contains(&algorithm) {
                suites.extend(CipherSuite::by_certificate_key_algorithm(
                    algorithm,
                    recommended_only,
                ));
            }
        }
    }

    if let Some(store) = &raw.psk_store {
        if store.has_ecdhe_psk_supported() {
            suites.extend(CipherSuite::by_key_exchange(
                KeyExchangeAlgorithm::EcdhePsk,
                recommended_only,
            ));
        }
        suites.extend(CipherSuite::by_key_exchange(
            KeyExchangeAlgorithm::Psk,
            recommended_only,
        ));
    }

    if suites.is_empty() && client_only && !recommended_only {
        suites.extend(CipherSuite::by_key_exchange(
            KeyExchangeAlgorithm::EcdhAnon,
            false,
        ));
    }

    if let Some(preselected) = &raw.preselected_cipher_suites {
        suites = preselected
            .iter()
            .copied()
            .filter(|cs| suites.contains(cs))
            .collect();
    }

    let unsupported: Vec<CipherSuite> = suites
        .iter()
        .copied()
        .filter(|cs| !provider.supports_cipher_suite(*cs))
        .collect();
    if !unsupported.is_empty() {
        warn!(
            "{}cipher suites not supported by the crypto provider: {}",
            tag,
            join(unsupported.iter())
        );
        suites.retain(|cs| !unsupported.contains(cs));
    }

    trace!("{}derived cipher suites: {}", tag, join(suites.iter()));
    suites
}

fn check_explicit_cipher_suites(
    suites: &[CipherSuite],
    recommended_only: bool,
    provider: &CryptoProvider,
) -> Result<(), Error> {
    if recommended_only {
        if let Some(names) = not_recommended(suites, CipherSuite::is_recommended) {
            return Err(ConsistencyError::NotRecommended {
                kind: "cipher suites",
                names,
            }
            .into());
        }
    }
    if let Some(suite) = suites.iter().find(|cs| !provider.supports_cipher_suite(**cs)) {
        return Err(ConsistencyError::UnsupportedCipherSuite(*suite).into());
    }
    Ok(())
}

/// Every suite must find the credentials it needs.
///
/// `verifier_required` is false when client authentication is only required
/// because of the default. A server without verifier then only warns.
fn check_credentials(
    raw: &RawOptions,
    suites: &[CipherSuite],
    helper: Option<&ConfigurationHelper>,
    client_only: bool,
    verifier_required: bool,
    tag: &str,
) -> Result<(), Error> {
    let identity_keys = identity_key_algorithms(raw.certificate_identity.as_deref(), helper);
    let mut warned = false;

    for suite in suites {
        if suite.is_psk_based() {
            let Some(store) = &raw.psk_store else {
                return Err(ConsistencyError::MissingPskStore(*suite).into());
            };
            if suite.is_ecc_based() && !store.has_ecdhe_psk_supported() {
                return Err(ConsistencyError::PskStoreWithoutEcdhe(*suite).into());
            }
        } else if let Some(algorithm) = suite.certificate_key_algorithm() {
            if raw.certificate_identity.is_none() {
                if !client_only {
                    return Err(ConsistencyError::MissingCertificateIdentity(*suite).into());
                }
            } else if let Some(keys) = &identity_keys {
                if !keys.contains(&algorithm) {
                    return Err(ConsistencyError::IncompatibleKeyAlgorithm {
                        suite: *suite,
                        algorithm,
                    }
                    .into());
                }
            }

            if raw.certificate_verifier.is_none() {
                if client_only || verifier_required {
                    return Err(ConsistencyError::MissingCertificateVerifier(*suite).into());
                }
                if !warned {
                    warn!(
                        "{}no certificate verifier, clients can't authenticate with certificates",
                        tag
                    );
                    warned = true;
                }
            }
        }
    }
    Ok(())
}

fn resolve_signature_algorithms(
    explicit: Option<&[SignatureAndHashAlgorithm]>,
    helper: Option<&ConfigurationHelper>,
    recommended_only: bool,
    provider: &CryptoProvider,
    tag: &str,
) -> Result<Vec<SignatureAndHashAlgorithm>, Error> {
    let algorithms = match explicit {
        Some(explicit) => {
            if recommended_only {
                if let Some(names) =
                    not_recommended(explicit, SignatureAndHashAlgorithm::is_recommended)
                {
                    return Err(ConsistencyError::NotRecommended {
                        kind: "signature and hash algorithms",
                        names,
                    }
                    .into());
                }
            }
            if let Some(a) = explicit
                .iter()
                .find(|a| !provider.supports_signature_algorithm(**a))
            {
                return Err(ConsistencyError::UnsupportedSignatureAlgorithm(*a).into());
            }
            explicit.to_vec()
        }
        None => {
            let mut algorithms = SignatureAndHashAlgorithm::defaults().to_vec();
            if let Some(helper) = helper {
                for a in helper.default_signature_algorithms() {
                    if !algorithms.contains(a) {
                        algorithms.push(*a);
                    }
                }
            }
            filter_derived(
                algorithms,
                "signature algorithms",
                |a| !recommended_only || a.is_recommended(),
                |a| provider.supports_signature_algorithm(*a),
                tag,
            )
        }
    };

    if algorithms.is_empty() {
        return Err(ConsistencyError::NoSignatureAlgorithms.into());
    }
    Ok(algorithms)
}

fn resolve_supported_groups(
    explicit: Option<&[NamedGroup]>,
    helper: Option<&ConfigurationHelper>,
    recommended_only: bool,
    provider: &CryptoProvider,
    tag: &str,
) -> Result<Vec<NamedGroup>, Error> {
    let groups = match explicit {
        Some(explicit) => {
            if recommended_only {
                if let Some(names) = not_recommended(explicit, NamedGroup::is_recommended) {
                    return Err(ConsistencyError::NotRecommended {
                        kind: "supported groups (curves)",
                        names,
                    }
                    .into());
                }
            }
            if let Some(g) = explicit.iter().find(|g| !provider.supports_group(**g)) {
                return Err(ConsistencyError::UnsupportedGroup(*g).into());
            }
            explicit.to_vec()
        }
        None => {
            let mut groups = NamedGroup::preferred().to_vec();
            if let Some(helper) = helper {
                for g in helper.default_supported_groups() {
                    if !groups.contains(g) {
                        groups.push(*g);
                    }
                }
            }
            filter_derived(
                groups,
                "supported groups",
                |g| !recommended_only || g.is_recommended(),
                |g| provider.supports_group(*g),
                tag,
            )
        }
    };

    if groups.is_empty() {
        return Err(ConsistencyError::NoSupportedGroups.into());
    }
    Ok(groups)
}

/// Drop derived entries failing the gate or unknown to the provider.
fn filter_derived<T, R, S>(
    mut items: Vec<T>,
    kind: &str,
    recommended: R,
    supported: S,
    tag: &str,
) -> Vec<T>
where
    T: std::fmt::Display,
    R: Fn(&T) -> bool,
    S: Fn(&T) -> bool,
{
    let before = items.len();
    items.retain(|item| {
        let keep = recommended(item) && supported(item);
        if !keep {
            debug!("{}{} {} left out", tag, kind, item);
        }
        keep
    });
    if items.len() < before {
        warn!(
            "{}{} of {} default {} are not usable",
            tag,
            before - items.len(),
            before,
            kind
        );
    }
    items
}

/// The identity certificate must allow the roles the connector acts in.
fn check_key_usage(
    identity: Option<&dyn CertificateProvider>,
    helper: Option<&ConfigurationHelper>,
    client_only: bool,
    server_only: bool,
) -> Result<(), Error> {
    let Some(identity) = identity else {
        return Ok(());
    };
    if !identity
        .supported_certificate_types()
        .contains(&CertificateType::X509)
    {
        return Ok(());
    }
    let Some(helper) = helper else {
        return Ok(());
    };

    if !server_only && !helper.can_be_used_for_authentication(true) {
        return Err(ConsistencyError::KeyUsage(Role::Client).into());
    }
    if !client_only && !helper.can_be_used_for_authentication(false) {
        return Err(ConsistencyError::KeyUsage(Role::Server).into());
    }
    Ok(())
}
