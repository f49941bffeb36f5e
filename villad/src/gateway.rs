//! 3-D Secure hosted-payment gateway integration.
//!
//! The gateway uses the "3D_PAY_HOSTING" model: this server assembles a map of
//! form fields including a base64-encoded digest computed with the merchant's
//! shared store key, the browser posts the form to the hosted payment page, and
//! the gateway calls back to `/api/ok` or `/api/fail` with the outcome.
//!
//! Two digest versions exist in merchant provisioning:
//! - `ver2`: SHA-1 over a fixed concatenation of fields
//! - `ver3`: SHA-512 over all posted field values sorted by name, `|`-joined,
//!   with the store key appended last
//!
//! A deployment is pinned to one version via `gateway.hash_version` in config.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use rand::prelude::RngExt;
use rand::rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha512};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::GatewayConfig;

/// Transaction type posted to the gateway. Only authorizations are used.
const TRAN_TYPE: &str = "Auth";

/// Installment count field. Always empty (single payment).
const INSTALLMENT: &str = "";

/// Hash algorithm version the merchant account is provisioned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashVersion {
    /// SHA-1 over a fixed field concatenation
    Ver2,
    /// SHA-512 over sorted field values
    Ver3,
}

impl HashVersion {
    /// Value sent in the `HashAlgorithm` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashVersion::Ver2 => "ver2",
            HashVersion::Ver3 => "ver3",
        }
    }
}

/// A ready-to-post hosted payment form.
#[derive(Debug, Clone)]
pub struct PaymentForm {
    /// Hosted payment page URL to post the form to
    pub gate: String,
    /// Form fields, digest included
    pub fields: BTreeMap<String, String>,
    /// Order id identifying this payment attempt
    pub oid: String,
}

/// Generate a gateway order id: 20 lowercase hex chars from a fresh UUID.
///
/// The gateway caps order ids at 20 chars, so the UUID is truncated rather
/// than sent whole.
pub fn generate_order_id() -> String {
    let mut oid = Uuid::new_v4().simple().to_string();
    oid.truncate(20);
    oid
}

/// Generate the per-attempt nonce: 16 random bytes as lowercase hex.
pub fn generate_rnd() -> String {
    let mut bytes = [0u8; 16];
    rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Format an amount the way the gateway expects: exactly two decimal places.
pub fn format_amount(amount: Decimal) -> String {
    let mut amt = amount;
    amt.rescale(2);
    amt.to_string()
}

/// Compute the `ver2` digest: SHA-1 over the fixed concatenation
/// `clientid + oid + amount + okUrl + failUrl + TranType + Installment + rnd + storeKey`,
/// base64-encoded.
pub fn compute_hash_ver2(gateway: &GatewayConfig, oid: &str, amount: &str, rnd: &str) -> String {
    let plain = format!(
        "{}{}{}{}{}{}{}{}{}",
        gateway.client_id, oid, amount, gateway.ok_url, gateway.fail_url, TRAN_TYPE, INSTALLMENT, rnd, gateway.store_key
    );

    let digest = Sha1::digest(plain.as_bytes());
    BASE64_STANDARD.encode(digest)
}

/// Compute the `ver3` digest: field values sorted by case-insensitive field
/// name, joined with `|` (values escape `\` and `|` with a backslash), store
/// key appended last, SHA-512, base64-encoded.
///
/// The `hash` and `encoding` fields are excluded from the computation.
pub fn compute_hash_ver3(fields: &BTreeMap<String, String>, store_key: &str) -> String {
    let mut keys: Vec<&String> = fields
        .keys()
        .filter(|k| {
            let k = k.to_lowercase();
            k != "hash" && k != "encoding"
        })
        .collect();
    keys.sort_by_key(|k| k.to_lowercase());

    let mut parts: Vec<String> = keys.into_iter().map(|k| escape(&fields[k])).collect();
    parts.push(escape(store_key));

    let digest = Sha512::digest(parts.join("|").as_bytes());
    BASE64_STANDARD.encode(digest)
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('|', "\\|")
}

/// Assemble the hosted payment form for one payment attempt.
///
/// Generates a fresh order id and nonce, lays out the standard fields, merges
/// any caller-supplied extras (extras win on key collision, mirroring how the
/// checkout page passes booking references through), then computes the digest
/// for the configured hash version.
pub fn build_payment_form(
    gateway: &GatewayConfig,
    amount: Decimal,
    email: &str,
    extra: &BTreeMap<String, String>,
) -> PaymentForm {
    let oid = generate_order_id();
    let rnd = generate_rnd();
    let amt = format_amount(amount);

    let mut fields = BTreeMap::new();
    fields.insert("clientid".to_string(), gateway.client_id.clone());
    fields.insert("oid".to_string(), oid.clone());
    fields.insert("amount".to_string(), amt.clone());
    fields.insert("okUrl".to_string(), gateway.ok_url.clone());
    fields.insert("failUrl".to_string(), gateway.fail_url.clone());
    fields.insert("TranType".to_string(), TRAN_TYPE.to_string());
    fields.insert("Installment".to_string(), INSTALLMENT.to_string());
    fields.insert("rnd".to_string(), rnd.clone());
    fields.insert("storetype".to_string(), gateway.store_type.clone());
    fields.insert("currency".to_string(), gateway.currency.clone());
    fields.insert("lang".to_string(), gateway.lang.clone());
    fields.insert("email".to_string(), email.to_string());
    fields.insert("HashAlgorithm".to_string(), gateway.hash_version.as_str().to_string());
    fields.insert("encoding".to_string(), "UTF-8".to_string());

    for (key, value) in extra {
        fields.insert(key.clone(), value.clone());
    }

    let hash = match gateway.hash_version {
        HashVersion::Ver2 => compute_hash_ver2(gateway, &oid, &amt, &rnd),
        HashVersion::Ver3 => compute_hash_ver3(&fields, &gateway.store_key),
    };
    fields.insert("hash".to_string(), hash);

    PaymentForm {
        gate: gateway.gate_url.clone(),
        fields,
        oid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_gateway(version: HashVersion) -> GatewayConfig {
        GatewayConfig {
            client_id: "700655000200".to_string(),
            store_key: "TEST1234".to_string(),
            gate_url: "https://sanalpos.example.com/fim/est3Dgate".to_string(),
            ok_url: "https://api.example.com/api/ok".to_string(),
            fail_url: "https://api.example.com/api/fail".to_string(),
            front_ok: "https://example.com/payment-result".to_string(),
            front_fail: "https://example.com/payment-result".to_string(),
            hash_version: version,
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_generate_order_id() {
        let oid1 = generate_order_id();
        let oid2 = generate_order_id();

        assert_ne!(oid1, oid2);
        assert_eq!(oid1.len(), 20);
        assert!(oid1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_rnd() {
        let rnd1 = generate_rnd();
        let rnd2 = generate_rnd();

        assert_ne!(rnd1, rnd2);
        assert_eq!(rnd1.len(), 32);
        assert!(rnd1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from(150)), "150.00");
        assert_eq!(format_amount("99.5".parse().unwrap()), "99.50");
        assert_eq!(format_amount("250.00".parse().unwrap()), "250.00");
    }

    #[test]
    fn test_ver2_known_digest() {
        let gateway = test_gateway(HashVersion::Ver2);

        let hash = compute_hash_ver2(
            &gateway,
            "abc123def456abc123de",
            "150.00",
            "0123456789abcdef0123456789abcdef",
        );

        // Independently computed: sha1 of the concatenated fields, base64
        assert_eq!(hash, "jthWrUYS1QtYx0EOVl59PnEv2SM=");
    }

    #[test]
    fn test_ver2_sensitivity() {
        let gateway = test_gateway(HashVersion::Ver2);

        let base = compute_hash_ver2(&gateway, "oid1", "150.00", "rnd1");
        assert_eq!(base, compute_hash_ver2(&gateway, "oid1", "150.00", "rnd1"));

        assert_ne!(base, compute_hash_ver2(&gateway, "oid2", "150.00", "rnd1"));
        assert_ne!(base, compute_hash_ver2(&gateway, "oid1", "150.01", "rnd1"));
        assert_ne!(base, compute_hash_ver2(&gateway, "oid1", "150.00", "rnd2"));

        let mut other_key = gateway.clone();
        other_key.store_key = "OTHER".to_string();
        assert_ne!(base, compute_hash_ver2(&other_key, "oid1", "150.00", "rnd1"));
    }

    #[test]
    fn test_ver3_known_digest() {
        let mut fields = BTreeMap::new();
        fields.insert("clientid".to_string(), "700655000200".to_string());
        fields.insert("oid".to_string(), "abc123def456abc123de".to_string());
        fields.insert("amount".to_string(), "150.00".to_string());
        fields.insert("okUrl".to_string(), "https://api.example.com/api/ok".to_string());
        fields.insert("failUrl".to_string(), "https://api.example.com/api/fail".to_string());
        fields.insert("TranType".to_string(), "Auth".to_string());
        fields.insert("Installment".to_string(), String::new());
        fields.insert("rnd".to_string(), "0123456789abcdef0123456789abcdef".to_string());
        fields.insert("storetype".to_string(), "3D_PAY_HOSTING".to_string());
        fields.insert("currency".to_string(), "978".to_string());
        fields.insert("lang".to_string(), "en".to_string());
        fields.insert("email".to_string(), "guest@example.com".to_string());
        fields.insert("HashAlgorithm".to_string(), "ver3".to_string());
        fields.insert("encoding".to_string(), "UTF-8".to_string());

        let hash = compute_hash_ver3(&fields, "TEST1234");

        // Independently computed: sha512 over the sorted, pipe-joined values
        assert_eq!(
            hash,
            "IsjonLKAFQLLWctpvH92G6xo4V3UqolP0H08xwbzyJXpYLN0+mKGI3Cn+cdmEFr5/lLwwR2EZNwUyALZG0VP8Q=="
        );

        // The excluded fields never influence the digest
        let mut with_hash = fields.clone();
        with_hash.insert("hash".to_string(), "anything".to_string());
        assert_eq!(compute_hash_ver3(&with_hash, "TEST1234"), hash);

        let mut without_encoding = fields.clone();
        without_encoding.remove("encoding");
        assert_eq!(compute_hash_ver3(&without_encoding, "TEST1234"), hash);

        // Any included field changes it
        let mut changed = fields.clone();
        changed.insert("amount".to_string(), "150.01".to_string());
        assert_ne!(compute_hash_ver3(&changed, "TEST1234"), hash);
    }

    #[test]
    fn test_ver3_escaping() {
        let mut fields = BTreeMap::new();
        fields.insert("A".to_string(), "x".to_string());
        fields.insert("b".to_string(), "a|b\\c".to_string());

        let hash = compute_hash_ver3(&fields, "k|ey");

        // Independently computed over the escaped join: x|a\|b\\c|k\|ey
        assert_eq!(
            hash,
            "hoj/eJcPTzzCgxSlEMNr/U7Mcztf6malqg2CpXjARyy7yiXML+Tk7xM+RszEyBLwAnh6QbICpZj/hb4KgL0hig=="
        );
    }

    #[test]
    fn test_build_payment_form_ver3() {
        let gateway = test_gateway(HashVersion::Ver3);

        let form = build_payment_form(&gateway, Decimal::from(150), "guest@example.com", &BTreeMap::new());

        assert_eq!(form.gate, gateway.gate_url);
        assert_eq!(form.oid.len(), 20);
        assert_eq!(form.fields["clientid"], "700655000200");
        assert_eq!(form.fields["oid"], form.oid);
        assert_eq!(form.fields["amount"], "150.00");
        assert_eq!(form.fields["TranType"], "Auth");
        assert_eq!(form.fields["Installment"], "");
        assert_eq!(form.fields["storetype"], "3D_PAY_HOSTING");
        assert_eq!(form.fields["currency"], "978");
        assert_eq!(form.fields["lang"], "en");
        assert_eq!(form.fields["HashAlgorithm"], "ver3");
        assert_eq!(form.fields["encoding"], "UTF-8");

        // The posted digest matches a recomputation over the posted fields
        let expected = compute_hash_ver3(&form.fields, &gateway.store_key);
        assert_eq!(form.fields["hash"], expected);
    }

    #[test]
    fn test_build_payment_form_ver2() {
        let gateway = test_gateway(HashVersion::Ver2);

        let form = build_payment_form(&gateway, "99.5".parse().unwrap(), "guest@example.com", &BTreeMap::new());

        assert_eq!(form.fields["HashAlgorithm"], "ver2");
        assert_eq!(form.fields["amount"], "99.50");

        let expected = compute_hash_ver2(&gateway, &form.oid, "99.50", &form.fields["rnd"]);
        assert_eq!(form.fields["hash"], expected);
    }

    #[test]
    fn test_build_payment_form_extra_fields() {
        let gateway = test_gateway(HashVersion::Ver3);

        let mut extra = BTreeMap::new();
        extra.insert("bookingId".to_string(), "3f2b8c1e".to_string());
        extra.insert("lang".to_string(), "sq".to_string());

        let form = build_payment_form(&gateway, Decimal::from(250), "guest@example.com", &extra);

        // Extras are carried into the form and win on collision
        assert_eq!(form.fields["bookingId"], "3f2b8c1e");
        assert_eq!(form.fields["lang"], "sq");

        // And they are part of the digest
        let expected = compute_hash_ver3(&form.fields, &gateway.store_key);
        assert_eq!(form.fields["hash"], expected);
    }
}
