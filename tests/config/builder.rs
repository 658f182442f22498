//! Set-time checks of the option setters.

use std::time::Duration;

use dtls_config::{
    CipherSuite, Config, Error, HandshakeMode, NamedGroup, OptionError, ProtocolVersion,
    SignatureAndHashAlgorithm,
};

use crate::common::*;

fn option_error<T: std::fmt::Debug>(result: Result<T, Error>) -> OptionError {
    match result {
        Err(Error::Option(e)) => e,
        other => panic!("expected option error, got {:?}", other),
    }
}

#[test]
fn mtu_and_mtu_limit_exclude_each_other() {
    let _ = env_logger::try_init();

    let err = option_error(
        Config::builder()
            .max_transmission_unit(1280)
            .unwrap()
            .max_transmission_unit_limit(1400),
    );
    assert!(matches!(err, OptionError::Conflict { .. }));

    let err = option_error(
        Config::builder()
            .max_transmission_unit_limit(1400)
            .unwrap()
            .max_transmission_unit(1280),
    );
    assert!(matches!(err, OptionError::Conflict { .. }));
}

#[test]
fn record_size_limit_range() {
    assert!(Config::builder().record_size_limit(64).is_ok());
    assert!(Config::builder().record_size_limit(65535).is_ok());

    let err = option_error(Config::builder().record_size_limit(63));
    assert_eq!(
        err,
        OptionError::OutOfRange {
            option: "record size limit",
            value: 63,
            expected: "[64, 65535]",
        }
    );
    assert!(Config::builder().record_size_limit(65536).is_err());
}

#[test]
fn max_fragment_length_code_range() {
    for code in 1..=4 {
        assert!(Config::builder().max_fragment_length_code(code).is_ok());
    }
    assert!(Config::builder().max_fragment_length_code(0).is_err());
    assert!(Config::builder().max_fragment_length_code(5).is_err());
}

#[test]
fn counts_must_be_positive() {
    assert!(Config::builder().max_retransmissions(0).is_err());
    assert!(Config::builder().max_connections(0).is_err());
    assert!(Config::builder().connection_thread_count(0).is_err());
    assert!(Config::builder().receiver_thread_count(0).is_err());
    assert!(Config::builder().outbound_message_buffer_size(0).is_err());
    assert!(Config::builder().socket_receive_buffer_size(0).is_err());
    assert!(Config::builder().socket_send_buffer_size(0).is_err());
    assert!(Config::builder()
        .max_fragmented_handshake_message_length(0)
        .is_err());
    assert!(Config::builder().max_retransmissions(1).is_ok());
}

#[test]
fn durations_have_lower_bounds() {
    assert!(Config::builder()
        .stale_connection_threshold(Duration::from_millis(999))
        .is_err());
    assert!(Config::builder()
        .stale_connection_threshold(Duration::from_secs(1))
        .is_ok());
    assert!(Config::builder()
        .health_status_interval(Duration::from_millis(500))
        .is_err());
    assert!(Config::builder()
        .auto_resumption_timeout(Duration::ZERO)
        .is_err());
    assert!(Config::builder()
        .auto_resumption_timeout(Duration::from_millis(1))
        .is_ok());
}

#[test]
fn empty_lists_are_rejected() {
    assert_eq!(
        option_error(Config::builder().cipher_suites(vec![])),
        OptionError::EmptyList("cipher suites")
    );
    assert_eq!(
        option_error(Config::builder().supported_groups(vec![])),
        OptionError::EmptyList("supported groups (curves)")
    );
    assert!(Config::builder().preselected_cipher_suites(vec![]).is_err());
    assert!(Config::builder().signature_algorithms(vec![]).is_err());
}

#[test]
fn null_cipher_suite_is_rejected() {
    let err = option_error(
        Config::builder().cipher_suites(vec![
            CipherSuite::PSK_AES128_CCM_8,
            CipherSuite::NULL_WITH_NULL_NULL,
        ]),
    );
    assert_eq!(err, OptionError::NullCipherSuite);

    let err = option_error(Config::builder().cipher_suites_by_name(&["TLS_NULL_WITH_NULL_NULL"]));
    assert_eq!(err, OptionError::NullCipherSuite);
}

#[test]
fn unknown_names_are_rejected() {
    let err = option_error(Config::builder().cipher_suites_by_name(&["TLS_RSA_WITH_RC4_128_MD5"]));
    assert_eq!(
        err,
        OptionError::UnknownName {
            kind: "cipher suite",
            name: "TLS_RSA_WITH_RC4_128_MD5".to_string(),
        }
    );
    assert!(Config::builder()
        .supported_groups_by_name(&["curve4711"])
        .is_err());
    assert!(Config::builder()
        .signature_algorithms_by_name(&["MD5withRSA"])
        .is_err());
    assert!(Config::builder()
        .default_handshake_mode_by_name("probe")
        .is_err());
}

#[test]
fn names_are_parsed() {
    let builder = Config::builder()
        .cipher_suites_by_name(&[
            "TLS_PSK_WITH_AES_128_CCM_8",
            "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
        ])
        .unwrap()
        .signature_algorithms_by_name(&["SHA256withECDSA", "ED25519"])
        .unwrap()
        .default_handshake_mode_by_name("none")
        .unwrap();

    let config = build(
        builder
            .psk_store(psk_store(false))
            .certificate_identity(ecdsa_identity())
            .certificate_verifier(trust_verifier()),
    )
    .unwrap();
    assert_eq!(
        config.cipher_suites(),
        &[
            CipherSuite::PSK_AES128_CCM_8,
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256
        ]
    );
    assert_eq!(
        config.signature_algorithms(),
        &[
            SignatureAndHashAlgorithm::SHA256_WITH_ECDSA,
            SignatureAndHashAlgorithm::ED25519
        ]
    );
    assert_eq!(config.default_handshake_mode(), HandshakeMode::None);
}

#[test]
fn not_recommended_lists_need_relaxed_gate() {
    let err = option_error(Config::builder().cipher_suites(vec![CipherSuite::PSK_AES128_CBC_SHA256]));
    assert!(matches!(err, OptionError::NotRecommended { .. }));

    let builder = Config::builder()
        .recommended_cipher_suites_only(false)
        .unwrap()
        .cipher_suites(vec![CipherSuite::PSK_AES128_CBC_SHA256])
        .unwrap();

    // re-enabling the gate verifies what is already set
    let err = option_error(builder.recommended_cipher_suites_only(true));
    assert_eq!(
        err,
        OptionError::NotRecommended {
            kind: "cipher suites",
            names: "TLS_PSK_WITH_AES_128_CBC_SHA256".to_string(),
        }
    );

    assert!(Config::builder()
        .supported_groups(vec![NamedGroup::BrainpoolP256r1])
        .is_err());
    assert!(Config::builder()
        .recommended_supported_groups_only(false)
        .unwrap()
        .supported_groups(vec![NamedGroup::BrainpoolP256r1])
        .is_ok());
    assert!(Config::builder()
        .signature_algorithms(vec![SignatureAndHashAlgorithm::SHA1_WITH_ECDSA])
        .is_err());
}

#[test]
fn client_only_conflicts_with_server_options() {
    assert!(Config::builder()
        .client_auth_wanted(false)
        .unwrap()
        .client_only(true)
        .is_err());
    assert!(Config::builder()
        .use_server_session_id(false)
        .unwrap()
        .client_only(true)
        .is_err());
    assert!(Config::builder()
        .use_hello_verify_request(false)
        .unwrap()
        .client_only(true)
        .is_err());

    let client = Config::builder().client_only(true).unwrap();
    assert!(client.clone().client_auth_required(true).is_err());
    assert!(client.clone().client_auth_wanted(true).is_err());
    assert!(client.clone().use_server_session_id(false).is_err());
    assert!(client.clone().use_hello_verify_request(true).is_err());
    assert!(client.clone().use_hello_verify_request_for_psk(true).is_err());
    assert!(client.clone().server_only(true).is_err());
    // enabling the session id is the default anyway
    assert!(client.use_server_session_id(true).is_ok());
}

#[test]
fn server_only_rejects_auto_handshake() {
    assert!(Config::builder()
        .server_only(true)
        .unwrap()
        .default_handshake_mode(HandshakeMode::Auto)
        .is_err());
    assert!(Config::builder()
        .default_handshake_mode(HandshakeMode::Auto)
        .unwrap()
        .server_only(true)
        .is_err());
    assert!(Config::builder()
        .server_only(true)
        .unwrap()
        .default_handshake_mode(HandshakeMode::None)
        .is_ok());
}

#[test]
fn client_auth_wanted_and_required_exclude_each_other() {
    assert!(Config::builder()
        .client_auth_required(true)
        .unwrap()
        .client_auth_wanted(true)
        .is_err());
    assert!(Config::builder()
        .client_auth_wanted(true)
        .unwrap()
        .client_auth_required(true)
        .is_err());
    assert!(Config::builder()
        .client_auth_wanted(true)
        .unwrap()
        .client_auth_required(false)
        .is_ok());
}

#[test]
fn anti_replay_and_extended_window_in_both_orders() {
    assert!(Config::builder()
        .use_anti_replay_filter(true)
        .unwrap()
        .use_extended_window_filter(2)
        .is_err());
    assert!(Config::builder()
        .use_extended_window_filter(-1)
        .unwrap()
        .use_anti_replay_filter(true)
        .is_err());

    // level 0 disables the extended window
    assert!(Config::builder()
        .use_anti_replay_filter(true)
        .unwrap()
        .use_extended_window_filter(0)
        .is_ok());
    assert!(Config::builder()
        .use_anti_replay_filter(false)
        .unwrap()
        .use_extended_window_filter(2)
        .is_ok());
}

#[test]
fn hello_verify_request_for_psk_needs_psk_suite() {
    let err = option_error(
        Config::builder()
            .cipher_suites(vec![CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256])
            .unwrap()
            .use_hello_verify_request_for_psk(false),
    );
    assert_eq!(err, OptionError::NoPskCipherSuite);

    assert!(Config::builder()
        .cipher_suites(vec![
            CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256,
            CipherSuite::PSK_AES128_CCM_8
        ])
        .unwrap()
        .use_hello_verify_request_for_psk(false)
        .is_ok());

    // and the other way around
    assert!(Config::builder()
        .use_hello_verify_request_for_psk(false)
        .unwrap()
        .cipher_suites(vec![CipherSuite::ECDHE_ECDSA_AES128_GCM_SHA256])
        .is_err());
}

#[test]
fn disabled_hello_verify_request_conflicts() {
    assert!(Config::builder()
        .use_hello_verify_request_for_psk(true)
        .unwrap()
        .use_hello_verify_request(false)
        .is_err());
    assert!(Config::builder()
        .use_hello_verify_request(false)
        .unwrap()
        .use_hello_verify_request_for_psk(true)
        .is_err());
    assert!(Config::builder()
        .verify_peers_on_resumption_threshold(20)
        .unwrap()
        .use_hello_verify_request(false)
        .is_err());
    assert!(Config::builder()
        .use_hello_verify_request(false)
        .unwrap()
        .verify_peers_on_resumption_threshold(20)
        .is_err());
    assert!(Config::builder()
        .verify_peers_on_resumption_threshold(101)
        .is_err());
}

#[test]
fn hello_verify_request_version() {
    assert!(Config::builder()
        .protocol_version_for_hello_verify_requests(ProtocolVersion::DTLS1_0)
        .is_ok());
    assert!(Config::builder()
        .protocol_version_for_hello_verify_requests(ProtocolVersion::DTLS1_2)
        .is_ok());
    assert_eq!(
        option_error(
            Config::builder().protocol_version_for_hello_verify_requests(ProtocolVersion::DTLS1_3)
        ),
        OptionError::UnsupportedProtocolVersion(ProtocolVersion::DTLS1_3)
    );
}
