use rand::RngCore;

/// Number of random bytes behind an order correlation id.
const ORDER_ID_BYTES: usize = 8;

/// Generates the opaque correlation token that ties a redirect-time checkout request to the webhook event Stripe
/// delivers later. URL-safe so it can ride in the success-URL query string unescaped.
pub fn new_order_public_id() -> String {
    let mut bytes = [0u8; ORDER_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}
