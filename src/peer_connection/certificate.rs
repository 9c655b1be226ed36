//! Certificate identity used during DTLS negotiation.
//!
//! Key generation and the DTLS handshake happen outside this crate; the
//! connection only needs the certificate fingerprint to advertise in SDP.

/// RTCDtlsFingerprint specifies the hash function and the certificate
/// fingerprint value as its lowercase hex digest pairs.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RTCDtlsFingerprint {
    /// Hash function name, e.g. "sha-256".
    pub algorithm: String,

    /// Colon-separated hex pairs, e.g. "5A:1B:...".
    pub value: String,
}

/// RTCCertificate represents the certificate the connection authenticates
/// with during the DTLS handshake.
#[derive(Debug, Clone)]
pub struct RTCCertificate {
    fingerprint: RTCDtlsFingerprint,
}

impl RTCCertificate {
    /// Wraps a fingerprint computed by the external DTLS stack.
    pub fn from_fingerprint(algorithm: String, value: String) -> Self {
        RTCCertificate {
            fingerprint: RTCDtlsFingerprint { algorithm, value },
        }
    }

    /// Generates a certificate with a random sha-256 fingerprint. Stands in
    /// for the external DTLS stack when the application supplies none.
    pub(crate) fn generate() -> Self {
        let bytes: [u8; 32] = rand::random();
        let value = bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":");

        RTCCertificate::from_fingerprint("sha-256".to_owned(), value)
    }

    pub fn fingerprint(&self) -> &RTCDtlsFingerprint {
        &self.fingerprint
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_generated_fingerprint_shape() {
        let cert = RTCCertificate::generate();
        let fp = cert.fingerprint();

        assert_eq!(fp.algorithm, "sha-256");
        assert_eq!(fp.value.split(':').count(), 32);
        assert!(fp
            .value
            .split(':')
            .all(|pair| pair.len() == 2 && pair.chars().all(|c| c.is_ascii_hexdigit())));
    }

    #[test]
    fn test_from_fingerprint() {
        let cert = RTCCertificate::from_fingerprint("sha-256".to_owned(), "AA:BB".to_owned());
        assert_eq!(cert.fingerprint().value, "AA:BB");
    }
}
