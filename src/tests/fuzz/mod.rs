//! Fuzz tests: CLI output parsers and wire decoders fed random input.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cli::output::{json_after_banner, parse_go_duration};
use crate::cli::{key_value_pairs_to_map, key_value_settings_to_map};
use crate::model::{BlockSummary, Confirmation, Node, ProviderReward, RewardType};

const FRAGMENTS: &[&str] = &["\t", " ", "1", "-", ".", "e", "h", "m", "s", "true", "ab", "{", "}", "0chain-core-sdk", "µ"];

fn random_line(rng: &mut impl Rng) -> String {
    let n = rng.gen_range(0..12);
    let mut line = String::new();
    for _ in 0..n {
        if let Some(f) = FRAGMENTS.choose(&mut *rng) {
            line.push_str(f);
        }
    }
    line
}

#[test]
fn fuzz_cli_table_parsing() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let lines: Vec<String> = (0..rng.gen_range(0..8)).map(|_| random_line(&mut rng)).collect();
        let (strings, numbers) = key_value_pairs_to_map(&lines);
        assert!(numbers.len() <= strings.len());
        let _ = key_value_settings_to_map(&lines);
        let _ = json_after_banner(&lines, "Allocations");
        for l in &lines {
            let _ = parse_go_duration(l);
        }
    }
}

#[test]
fn fuzz_wire_decoding() {
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let bogus: Vec<u8> = (0..rng.gen_range(0..96)).map(|_| rng.gen()).collect();
        let _ = serde_json::from_slice::<Confirmation>(&bogus);
        let _ = serde_json::from_slice::<Node>(&bogus);
        let _ = serde_json::from_slice::<BlockSummary>(&bogus);
    }
}

#[test]
fn fuzz_reward_type_codes() {
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let code: i64 = rng.gen_range(-50..50);
        match RewardType::from_code(code) {
            Some(t) => assert_eq!(t.code(), code),
            None => {
                let row = serde_json::json!({ "provider_id": "p", "reward_type": code, "amount": 1, "block_number": 1 });
                assert!(serde_json::from_value::<ProviderReward>(row).is_err());
            }
        }
    }
}
