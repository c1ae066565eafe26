use rand::Rng;
use uuid::Uuid;

/// Draws the farm's session id at location select.
///
/// Takes exactly 16 bytes from the session RNG, before any soil is laid out,
/// so a replayed seed gets the same id and the same field.
pub fn generate_session_id(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}
