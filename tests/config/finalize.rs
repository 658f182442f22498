//! Defaults, derivation and consistency checks of a finished configuration.

use std::sync::Arc;
use std::time::Duration;

use dtls_config::crypto::{default_provider, CryptoProvider};
use dtls_config::{
    CertificateKeyAlgorithm, CipherSuite, Config, ConsistencyError, Error,
    ExtendedMasterSecretMode, HandshakeMode, KeyExchangeAlgorithm, NamedGroup, Platform, Role,
    SignatureAndHashAlgorithm, DEFAULT_ADDRESS,
};
use rcgen::ExtendedKeyUsagePurpose;

use crate::common::*;

fn consistency_error(result: Result<Config, Error>) -> ConsistencyError {
    match result {
        Err(Error::Consistency(e)) => e,
        other => panic!("expected consistency error, got {:?}", other),
    }
}

fn assert_ecc_lists(config: &Config) {
    if config.capabilities().has_ecc {
        assert!(!config.signature_algorithms().is_empty());
        assert!(!config.supported_groups().is_empty());
    } else {
        assert!(config.signature_algorithms().is_empty());
        assert!(config.supported_groups().is_empty());
    }
}

#[test]
fn defaults() {
    let config = build(Config::builder().psk_store(psk_store(false))).unwrap();

    assert_eq!(config.logging_tag(), "");
    assert_eq!(config.address(), DEFAULT_ADDRESS);
    assert!(!config.client_only());
    assert!(!config.server_only());
    assert_eq!(config.default_handshake_mode(), HandshakeMode::Auto);
    assert!(!config.client_auth_wanted());
    assert!(config.client_auth_required());
    assert_eq!(config.retransmission_timeout(), Duration::from_millis(2000));
    assert_eq!(config.additional_timeout_for_ecc(), Duration::ZERO);
    assert_eq!(config.max_retransmissions(), 4);
    assert_eq!(config.backoff_retransmission(), 2);
    assert!(config.early_stop_retransmission());
    assert_eq!(config.max_transmission_unit(), None);
    assert_eq!(config.max_transmission_unit_limit(), Some(1500));
    assert_eq!(config.max_fragmented_handshake_message_length(), 8192);
    assert_eq!(config.outbound_message_buffer_size(), 100_000);
    assert_eq!(config.max_connections(), 150_000);
    assert_eq!(config.stale_connection_threshold(), Duration::from_secs(1800));
    assert_eq!(config.health_status_interval(), None);
    assert!(config.use_server_session_id());
    assert_eq!(config.verify_peers_on_resumption_threshold(), 30);
    assert!(config.use_hello_verify_request());
    assert!(config.use_hello_verify_request_for_psk());
    assert!(config.use_anti_replay_filter());
    assert_eq!(config.use_extended_window_filter(), 0);
    assert!(config.cid_update_address_on_newer_record_filter());
    assert!(!config.sni_enabled());
    assert_eq!(
        config.extended_master_secret_mode(),
        ExtendedMasterSecretMode::Enabled
    );
    assert!(config.truncate_client_certificate_path());
    assert!(config.truncate_certificate_path_for_validation());
    assert!(config.recommended_cipher_suites_only());
    assert_eq!(config.crypto_provider(), &default_provider());
}

#[test]
fn logging_tag_is_normalized() {
    let config = build(
        Config::builder()
            .logging_tag("coap")
            .psk_store(psk_store(false)),
    )
    .unwrap();
    assert_eq!(config.logging_tag(), "coap ");
}

#[test]
fn thread_counts_follow_cores() {
    let builder = Config::builder().psk_store(psk_store(false));

    let config = builder
        .clone()
        .build_with(&Platform::new(3, default_provider()))
        .unwrap();
    assert_eq!(config.connection_thread_count(), 18);
    assert_eq!(config.receiver_thread_count(), 2);

    let config = builder
        .clone()
        .build_with(&Platform::new(1, default_provider()))
        .unwrap();
    assert_eq!(config.connection_thread_count(), 6);
    assert_eq!(config.receiver_thread_count(), 1);

    let config = builder
        .receiver_thread_count(7)
        .unwrap()
        .build_with(&Platform::new(1, default_provider()))
        .unwrap();
    assert_eq!(config.receiver_thread_count(), 7);
}

#[test]
fn backoff_is_half_of_max_retransmissions() {
    let config = build(
        Config::builder()
            .psk_store(psk_store(false))
            .max_retransmissions(5)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(config.backoff_retransmission(), 2);

    let config = build(
        Config::builder()
            .psk_store(psk_store(false))
            .max_retransmissions(1)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(config.backoff_retransmission(), 0);

    let config = build(
        Config::builder()
            .psk_store(psk_store(false))
            .backoff_retransmission(3),
    )
    .unwrap();
    assert_eq!(config.backoff_retransmission(), 3);
}

#[test]
fn fixed_mtu_has_no_limit() {
    let config = build(
        Config::builder()
            .psk_store(psk_store(false))
            .max_transmission_unit(1280)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(config.max_transmission_unit(), Some(1280));
    assert_eq!(config.max_transmission_unit_limit(), None);
}

#[test]
fn no_credentials_no_cipher_suites() {
    let err = consistency_error(build(Config::builder()));
    assert_eq!(err, ConsistencyError::NoCipherSuites);

    let err = consistency_error(build(Config::builder().server_only(true).unwrap()));
    assert_eq!(err, ConsistencyError::NoCipherSuites);

    // anonymous suites don't authenticate a server
    let err = consistency_error(build(
        Config::builder()
            .recommended_cipher_suites_only(false)
            .unwrap()
            .cipher_suites(vec![CipherSuite::ECDH_ANON_AES128_CBC_SHA])
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::NoCredentials);
}

#[test]
fn psk_store_without_ecdhe_derives_plain_psk() {
    let config = build(Config::builder().psk_store(psk_store(false))).unwrap();
    let capabilities = config.capabilities();
    assert!(capabilities.has_psk);
    assert!(!capabilities.has_certificate);
    assert!(!capabilities.has_ecc);
    assert!(config
        .cipher_suites()
        .iter()
        .all(|cs| cs.key_exchange() == KeyExchangeAlgorithm::Psk));
    assert!(config.cipher_suites().iter().all(|cs| cs.is_recommended()));
    assert_ecc_lists(&config);
}

#[test]
fn psk_store_with_ecdhe_derives_ecdhe_psk_first() {
    let config = build(Config::builder().psk_store(psk_store(true))).unwrap();
    assert_eq!(
        config.cipher_suites()[0],
        CipherSuite::ECDHE_PSK_AES128_GCM_SHA256
    );
    assert!(config
        .cipher_suites()
        .contains(&CipherSuite::PSK_AES128_CCM_8));
    assert!(config.capabilities().has_ecc);
    assert_eq!(
        config.supported_groups(),
        &[NamedGroup::X25519, NamedGroup::Secp256r1, NamedGroup::Secp384r1]
    );
    assert_ecc_lists(&config);
}

#[test]
fn ecdhe_psk_suite_needs_ecdhe_store() {
    let err = consistency_error(build(
        Config::builder()
            .psk_store(psk_store(false))
            .cipher_suites(vec![CipherSuite::ECDHE_PSK_AES128_GCM_SHA256])
            .unwrap(),
    ));
    assert_eq!(
        err,
        ConsistencyError::PskStoreWithoutEcdhe(CipherSuite::ECDHE_PSK_AES128_GCM_SHA256)
    );

    let err = consistency_error(build(
        Config::builder()
            .cipher_suites(vec![CipherSuite::PSK_AES128_CCM_8])
            .unwrap(),
    ));
    assert_eq!(
        err,
        ConsistencyError::MissingPskStore(CipherSuite::PSK_AES128_CCM_8)
    );
}

#[test]
fn certificate_identity_default_role() {
    let config = build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier()),
    )
    .unwrap();

    let capabilities = config.capabilities();
    assert!(capabilities.has_certificate);
    assert!(!capabilities.has_psk);
    assert!(capabilities.has_ecc);
    assert!(config.client_auth_required());
    assert_eq!(
        config.cipher_suites()[0],
        CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256
    );
    assert!(config
        .cipher_suites()
        .iter()
        .all(|cs| cs.certificate_key_algorithm() == Some(CertificateKeyAlgorithm::Ec)));
    assert_eq!(
        config.signature_algorithms(),
        &[
            SignatureAndHashAlgorithm::SHA256_WITH_ECDSA,
            SignatureAndHashAlgorithm::SHA256_WITH_RSA
        ]
    );
    assert!(config.supported_groups().contains(&NamedGroup::Secp256r1));
    assert!(config.certificate_helper().is_some());
    assert_ecc_lists(&config);
}

#[test]
fn client_auth_required_by_default_without_verifier() {
    // accepted, the handshake fails closed
    let config = build(Config::builder().certificate_identity(ecdsa_identity())).unwrap();
    assert!(config.client_auth_required());
    assert!(config.certificate_verifier().is_none());

    let err = consistency_error(build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .client_auth_required(true)
            .unwrap(),
    ));
    assert!(matches!(err, ConsistencyError::MissingCertificateVerifier(_)));

    let err = consistency_error(build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .client_auth_wanted(true)
            .unwrap(),
    ));
    assert!(matches!(err, ConsistencyError::MissingCertificateVerifier(_)));

    let config = build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .client_auth_required(false)
            .unwrap(),
    )
    .unwrap();
    assert!(!config.client_auth_required());
}

#[test]
fn client_only_without_credentials_uses_anonymous_suites() {
    let config = build(
        Config::builder()
            .client_only(true)
            .unwrap()
            .recommended_cipher_suites_only(false)
            .unwrap(),
    )
    .unwrap();

    let capabilities = config.capabilities();
    assert!(!capabilities.has_certificate);
    assert!(!capabilities.has_psk);
    assert!(capabilities.has_ecc);
    assert_eq!(
        config.cipher_suites(),
        &[
            CipherSuite::ECDH_ANON_AES128_CBC_SHA,
            CipherSuite::ECDH_ANON_AES256_CBC_SHA
        ]
    );
    assert!(!config.client_auth_required());
    assert_ecc_lists(&config);

    // anonymous suites are not recommended
    let err = consistency_error(build(Config::builder().client_only(true).unwrap()));
    assert_eq!(err, ConsistencyError::NoCipherSuites);
}

#[test]
fn client_only_needs_verifier_not_identity() {
    let config = build(
        Config::builder()
            .client_only(true)
            .unwrap()
            .certificate_verifier(trust_verifier()),
    )
    .unwrap();
    assert!(config.capabilities().has_certificate);
    assert!(config.certificate_identity().is_none());

    let err = consistency_error(build(
        Config::builder()
            .client_only(true)
            .unwrap()
            .certificate_identity(ecdsa_identity()),
    ));
    assert!(matches!(err, ConsistencyError::MissingCertificateVerifier(_)));
}

#[test]
fn server_needs_identity() {
    let err = consistency_error(build(
        Config::builder().certificate_verifier(trust_verifier()),
    ));
    assert_eq!(
        err,
        ConsistencyError::MissingCertificateIdentity(CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256)
    );
}

#[test]
fn rsa_suite_needs_rsa_key() {
    let err = consistency_error(build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier())
            .cipher_suites(vec![CipherSuite::ECDHE_RSA_AES128_GCM_SHA256])
            .unwrap(),
    ));
    assert_eq!(
        err,
        ConsistencyError::IncompatibleKeyAlgorithm {
            suite: CipherSuite::ECDHE_RSA_AES128_GCM_SHA256,
            algorithm: CertificateKeyAlgorithm::Rsa,
        }
    );

    // nothing known about the key, nothing to check
    let config = build(
        Config::builder()
            .certificate_identity(Arc::new(OpaqueIdentity))
            .certificate_verifier(Arc::new(OpaqueVerifier))
            .cipher_suites(vec![CipherSuite::ECDHE_RSA_AES128_GCM_SHA256])
            .unwrap(),
    )
    .unwrap();
    assert!(config.certificate_helper().is_none());
}

#[test]
fn unused_credentials_are_rejected() {
    let err = consistency_error(build(
        Config::builder()
            .psk_store(psk_store(false))
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier())
            .cipher_suites(vec![CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256])
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::UnusedPskStore);

    let err = consistency_error(build(
        Config::builder()
            .psk_store(psk_store(false))
            .certificate_identity(ecdsa_identity())
            .cipher_suites(vec![CipherSuite::PSK_AES128_CCM_8])
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::UnusedCertificateIdentity);

    let err = consistency_error(build(
        Config::builder()
            .psk_store(psk_store(false))
            .certificate_verifier(trust_verifier())
            .cipher_suites(vec![CipherSuite::PSK_AES128_CCM_8])
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::UnusedCertificateVerifier);
}

#[test]
fn server_only_verifier_needs_client_authentication() {
    let err = consistency_error(build(
        Config::builder()
            .server_only(true)
            .unwrap()
            .client_auth_required(false)
            .unwrap()
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier()),
    ));
    assert_eq!(err, ConsistencyError::VerifierWithoutClientAuthentication);

    let config = build(
        Config::builder()
            .server_only(true)
            .unwrap()
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier()),
    )
    .unwrap();
    assert_eq!(config.default_handshake_mode(), HandshakeMode::None);
    assert!(config.client_auth_required());
}

#[test]
fn lists_without_ecc_are_rejected() {
    let err = consistency_error(build(
        Config::builder()
            .psk_store(psk_store(false))
            .signature_algorithms(vec![SignatureAndHashAlgorithm::SHA256_WITH_ECDSA])
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::SignatureAlgorithmsWithoutEcc);

    let err = consistency_error(build(
        Config::builder()
            .psk_store(psk_store(false))
            .supported_groups(vec![NamedGroup::Secp256r1])
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::SupportedGroupsWithoutEcc);
}

#[test]
fn explicit_lists_must_cover_the_certificate() {
    let err = consistency_error(build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier())
            .supported_groups(vec![NamedGroup::X25519])
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::CurveNotSupported(NamedGroup::Secp256r1));

    let err = consistency_error(build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier())
            .signature_algorithms(vec![SignatureAndHashAlgorithm::SHA256_WITH_RSA])
            .unwrap(),
    ));
    assert!(matches!(
        err,
        ConsistencyError::KeyWithoutSignatureAlgorithm(_)
    ));
}

#[test]
fn preselected_cipher_suites_restrict_and_order() {
    let config = build(
        Config::builder()
            .psk_store(psk_store(false))
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier())
            .preselected_cipher_suites(vec![
                CipherSuite::PSK_AES128_CCM_8,
                CipherSuite::ECDHE_PSK_AES128_GCM_SHA256,
                CipherSuite::ECDHE_ECDSA_AES128_CCM_8,
            ])
            .unwrap(),
    )
    .unwrap();

    // no ECDHE_PSK, the store can't do it
    assert_eq!(
        config.cipher_suites(),
        &[
            CipherSuite::PSK_AES128_CCM_8,
            CipherSuite::ECDHE_ECDSA_AES128_CCM_8
        ]
    );
    let capabilities = config.capabilities();
    assert!(capabilities.has_psk);
    assert!(capabilities.has_certificate);
}

#[test]
fn preselected_without_match_fails() {
    let err = consistency_error(build(
        Config::builder()
            .psk_store(psk_store(false))
            .preselected_cipher_suites(vec![CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256])
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::NoCipherSuites);
}

static PSK_CCM8_ONLY: &[CipherSuite] = &[
    CipherSuite::PSK_AES128_CCM_8,
    CipherSuite::ECDHE_PSK_AES128_GCM_SHA256,
];
static P256_ONLY: &[NamedGroup] = &[NamedGroup::Secp256r1];
static ECDSA_SHA256_ONLY: &[SignatureAndHashAlgorithm] =
    &[SignatureAndHashAlgorithm::SHA256_WITH_ECDSA];

fn small_platform() -> Platform {
    Platform::new(
        2,
        CryptoProvider {
            cipher_suites: PSK_CCM8_ONLY,
            groups: P256_ONLY,
            signature_algorithms: ECDSA_SHA256_ONLY,
        },
    )
}

#[test]
fn provider_limits_derivation() {
    let config = Config::builder()
        .psk_store(psk_store(true))
        .build_with(&small_platform())
        .unwrap();
    assert_eq!(
        config.cipher_suites(),
        &[
            CipherSuite::ECDHE_PSK_AES128_GCM_SHA256,
            CipherSuite::PSK_AES128_CCM_8
        ]
    );
    assert_eq!(config.supported_groups(), &[NamedGroup::Secp256r1]);
    assert_eq!(
        config.signature_algorithms(),
        &[SignatureAndHashAlgorithm::SHA256_WITH_ECDSA]
    );

    let result = Config::builder()
        .psk_store(psk_store(true))
        .signature_algorithms(vec![SignatureAndHashAlgorithm::SHA384_WITH_ECDSA])
        .unwrap()
        .build_with(&small_platform());
    assert_eq!(
        consistency_error(result),
        ConsistencyError::UnsupportedSignatureAlgorithm(SignatureAndHashAlgorithm::SHA384_WITH_ECDSA)
    );
}

#[test]
fn provider_rejects_explicit_suites() {
    let result = Config::builder()
        .psk_store(psk_store(false))
        .cipher_suites(vec![CipherSuite::PSK_AES256_CCM])
        .unwrap()
        .build_with(&small_platform());
    assert_eq!(
        consistency_error(result),
        ConsistencyError::UnsupportedCipherSuite(CipherSuite::PSK_AES256_CCM)
    );
}

#[test]
fn invalid_provider_is_rejected() {
    let platform = Platform::new(
        1,
        CryptoProvider {
            cipher_suites: &[],
            groups: &[],
            signature_algorithms: &[],
        },
    );
    let result = Config::builder()
        .psk_store(psk_store(false))
        .build_with(&platform);
    assert!(matches!(result, Err(Error::Provider(_))));
}

#[test]
fn hello_verify_request_for_psk_without_psk_suite() {
    let err = consistency_error(build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier())
            .use_hello_verify_request_for_psk(false)
            .unwrap(),
    ));
    assert_eq!(err, ConsistencyError::HelloVerifyRequestForPskWithoutPskSuite);

    let config = build(
        Config::builder()
            .psk_store(psk_store(false))
            .use_hello_verify_request_for_psk(false)
            .unwrap(),
    )
    .unwrap();
    assert!(config.use_hello_verify_request());
    assert!(!config.use_hello_verify_request_for_psk());
}

#[test]
fn disabled_hello_verify_request() {
    let config = build(
        Config::builder()
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier())
            .use_hello_verify_request(false)
            .unwrap(),
    )
    .unwrap();
    assert!(!config.use_hello_verify_request());
    assert!(!config.use_hello_verify_request_for_psk());
    assert_eq!(config.verify_peers_on_resumption_threshold(), 0);
}

#[test]
fn extended_window_replaces_anti_replay() {
    let config = build(
        Config::builder()
            .psk_store(psk_store(false))
            .use_extended_window_filter(-1)
            .unwrap(),
    )
    .unwrap();
    assert!(!config.use_anti_replay_filter());
    assert_eq!(config.use_extended_window_filter(), -1);

    let config = build(
        Config::builder()
            .psk_store(psk_store(false))
            .use_anti_replay_filter(false)
            .unwrap()
            .use_extended_window_filter(4)
            .unwrap(),
    )
    .unwrap();
    assert!(!config.use_anti_replay_filter());
}

#[test]
fn key_usage_must_fit_the_role() {
    let server_auth = || identity_with_usage(vec![ExtendedKeyUsagePurpose::ServerAuth]);

    let err = consistency_error(build(
        Config::builder()
            .certificate_identity(server_auth())
            .certificate_verifier(trust_verifier()),
    ));
    assert_eq!(err, ConsistencyError::KeyUsage(Role::Client));

    let err = consistency_error(build(
        Config::builder()
            .client_only(true)
            .unwrap()
            .certificate_identity(server_auth())
            .certificate_verifier(trust_verifier()),
    ));
    assert_eq!(err, ConsistencyError::KeyUsage(Role::Client));

    build(
        Config::builder()
            .server_only(true)
            .unwrap()
            .certificate_identity(server_auth())
            .certificate_verifier(trust_verifier()),
    )
    .unwrap();

    let client_auth = identity_with_usage(vec![ExtendedKeyUsagePurpose::ClientAuth]);
    let err = consistency_error(build(
        Config::builder()
            .server_only(true)
            .unwrap()
            .certificate_identity(client_auth)
            .certificate_verifier(trust_verifier()),
    ));
    assert_eq!(err, ConsistencyError::KeyUsage(Role::Server));
}

#[test]
fn relaxed_gates_allow_legacy_algorithms() {
    let config = build(
        Config::builder()
            .recommended_cipher_suites_only(false)
            .unwrap()
            .recommended_supported_groups_only(false)
            .unwrap()
            .psk_store(psk_store(true))
            .cipher_suites(vec![CipherSuite::ECDHE_PSK_AES128_CBC_SHA256])
            .unwrap()
            .supported_groups(vec![NamedGroup::BrainpoolP256r1])
            .unwrap(),
    )
    .unwrap();
    assert!(!config.recommended_cipher_suites_only());
    assert_eq!(config.supported_groups(), &[NamedGroup::BrainpoolP256r1]);
}
