#![allow(dead_code)]

use cardcheck::Institute;
use rand::Rng;
use rand::seq::SliceRandom;
use std::io::Error;
use tempfile::NamedTempFile;

/// Writes `id,number` rows to a temporary CSV file.
pub fn write_cards_csv(rows: &[(&str, &str)]) -> Result<NamedTempFile, Error> {
    let file = NamedTempFile::new()?;
    let mut wtr = csv::Writer::from_path(file.path())?;
    wtr.write_record(["id", "number"])?;
    for (id, number) in rows {
        wtr.write_record([*id, *number])?;
    }
    wtr.flush()?;
    Ok(file)
}

/// A random number that fits `institute`'s prefix and length rule and
/// carries a correct Luhn check digit.
pub fn random_card_number<R: Rng>(rng: &mut R, institute: Institute) -> String {
    let rule = institute.rule();
    let range = rule
        .prefix_ranges
        .choose(rng)
        .expect("every rule has a prefix range");
    let length = *rule
        .allowed_lengths
        .choose(rng)
        .expect("every rule has a length");

    let mut payload = rng.gen_range(range.start()..=range.end()).to_string();
    while payload.len() < length - 1 {
        payload.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    payload.push(luhn_check_digit(&payload));
    payload
}

fn luhn_check_digit(payload: &str) -> char {
    let sum: u32 = payload
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, digit)| {
            if i % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    char::from(b'0' + ((10 - sum % 10) % 10) as u8)
}
