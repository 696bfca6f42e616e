//! Wire-format encoding of record payloads
//!
//! Names are encoded as a sequence of length-prefixed labels terminated by a
//! zero byte (RFC 1035 §3.1). Empty labels are skipped, so `"a.b."` and
//! `"a.b"` encode identically.

use std::net::Ipv4Addr;

use crate::error::{Error, Result};

/// Longest label a length byte can describe (the top two bits are reserved)
pub const MAX_LABEL_LEN: usize = 63;

/// Longest encoded name, terminator included
pub const MAX_NAME_LEN: usize = 255;

/// Encode an FQDN into wire-format labels
///
/// # Errors
///
/// Returns [`Error::Encoding`] for non-ASCII names, labels longer than
/// [`MAX_LABEL_LEN`], or encodings longer than [`MAX_NAME_LEN`].
pub fn fqdn_to_rdata(fqdn: &str) -> Result<Vec<u8>> {
    if !fqdn.is_ascii() {
        return Err(Error::encoding(format!("'{}' is not an ASCII name", fqdn)));
    }

    let mut data = Vec::with_capacity(fqdn.len() + 2);
    for label in fqdn.split('.').filter(|label| !label.is_empty()) {
        if label.len() > MAX_LABEL_LEN {
            return Err(Error::encoding(format!(
                "label '{}' is {} bytes (max {})",
                label,
                label.len(),
                MAX_LABEL_LEN
            )));
        }
        data.push(label.len() as u8);
        data.extend_from_slice(label.as_bytes());
    }
    data.push(0);

    if data.len() > MAX_NAME_LEN {
        return Err(Error::encoding(format!(
            "'{}' encodes to {} bytes (max {})",
            fqdn,
            data.len(),
            MAX_NAME_LEN
        )));
    }

    Ok(data)
}

/// Encode an IPv4 address as A-record rdata (network byte order)
pub fn ipv4_to_rdata(addr: Ipv4Addr) -> [u8; 4] {
    addr.octets()
}
