use crate::domain::model::{Gender, PlayerDetails, Role};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};

// Age boundaries
pub const MIN_AGE: i32 = 17;
pub const MAX_AGE: i32 = 59;

// Password boundaries
pub const MIN_PASSWORD_LENGTH: usize = 7;
pub const MAX_PASSWORD_LENGTH: usize = 15;
pub const DEFAULT_PASSWORD_LENGTH: usize = 10;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const PASSWORD_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Millisecond stamp plus a process-wide sequence and a random tail, so two
/// calls in the same millisecond (or two runs in parallel) never collide.
fn unique_suffix() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let tail: u16 = rand::thread_rng().gen();
    format!("{}_{}{:04x}", millis, seq, tail)
}

pub fn random_login() -> String {
    format!("user_{}", unique_suffix())
}

pub fn random_screen_name() -> String {
    format!("screenName_{}", unique_suffix())
}

pub fn random_default_password() -> String {
    random_password(DEFAULT_PASSWORD_LENGTH)
}

/// Alphanumeric password of `length` characters (0 means the default length).
/// From two characters up it always mixes letters and digits, which the API
/// requires of a valid password.
pub fn random_password(length: usize) -> String {
    let length = if length == 0 {
        DEFAULT_PASSWORD_LENGTH
    } else {
        length
    };
    let mut rng = rand::thread_rng();

    let mut chars: Vec<u8> = (0..length)
        .map(|_| PASSWORD_CHARS[rng.gen_range(0..PASSWORD_CHARS.len())])
        .collect();

    if length >= 2 {
        let letter_slot = rng.gen_range(0..length);
        let mut digit_slot = rng.gen_range(0..length - 1);
        if digit_slot >= letter_slot {
            digit_slot += 1;
        }
        chars[letter_slot] = LETTERS[rng.gen_range(0..LETTERS.len())];
        chars[digit_slot] = DIGITS[rng.gen_range(0..DIGITS.len())];
    }

    String::from_utf8(chars).unwrap_or_default()
}

pub fn random_gender() -> Gender {
    *Gender::ALL
        .choose(&mut rand::thread_rng())
        .unwrap_or(&Gender::Male)
}

pub fn random_age() -> i32 {
    rand::thread_rng().gen_range(MIN_AGE..=MAX_AGE)
}

pub fn random_player_details(role: Role) -> PlayerDetails {
    PlayerDetails {
        age: random_age(),
        gender: random_gender(),
        login: random_login(),
        password: random_default_password(),
        role,
        screen_name: random_screen_name(),
    }
}

pub fn random_user_details() -> PlayerDetails {
    random_player_details(Role::User)
}
