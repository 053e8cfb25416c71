//! Display colours for newly registered domains

use rand::Rng;

/// Random `#rrggbb` colour
pub fn random_color() -> String {
    random_color_with(&mut rand::thread_rng())
}

pub fn random_color_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..=0x00FF_FFFFu32))
}
