//! Fixtures shared by unit tests.

use serde_json::{json, Map, Value};

use crate::database::models::{NewUser, NounCreate, NounDraft, VerbCreate, VerbDraft};
use crate::normalize::grammar::{CASES, PERSONS};
use crate::types::Role;

/// Declension with every case filled in from `stem`
pub fn full_declension(stem: &str) -> Value {
    let mut numbers = Map::new();
    for number in ["singular", "plural"] {
        let mut cases = Map::new();
        for case in CASES {
            cases.insert(case.to_string(), json!(format!("{}-{}-{}", stem, number, case)));
        }
        numbers.insert(number.to_string(), Value::Object(cases));
    }
    Value::Object(numbers)
}

fn persons(stem: &str) -> Value {
    let mut map = Map::new();
    for person in PERSONS {
        map.insert(person.to_string(), json!(format!("{}-{}", stem, person)));
    }
    Value::Object(map)
}

pub fn noun_create(noun: &str, gender: &str, translations: Value) -> NounCreate {
    NounCreate {
        noun: noun.to_string(),
        gender: gender.to_string(),
        translations,
        declension: full_declension(noun),
    }
}

pub fn noun_draft(noun: &str, translations: Value) -> NounDraft {
    noun_create(noun, "masculine", translations)
        .into_draft()
        .expect("fixture noun is valid")
}

pub fn verb_create(pair_id: &str, conjugation_type: i32, translations: Value) -> VerbCreate {
    VerbCreate {
        verb_pair_id: pair_id.to_string(),
        translations,
        conjugation_type,
        root: pair_id.chars().take(3).collect(),
        stress_pattern: None,
        imperfective: json!({
            "infinitive": format!("{}-ipf", pair_id),
            "present_tense": persons(pair_id),
            "past_tense": {"masculine": format!("{}-past", pair_id)}
        }),
        perfective: json!({
            "infinitive": format!("{}-pf", pair_id),
            "future_simple": persons(pair_id)
        }),
    }
}

pub fn verb_draft(pair_id: &str, conjugation_type: i32, translations: Value) -> VerbDraft {
    verb_create(pair_id, conjugation_type, translations)
        .into_draft()
        .expect("fixture verb is valid")
}

pub fn new_user(username: &str, role: Role) -> NewUser {
    NewUser {
        name: username.to_string(),
        country: None,
        email: format!("{}@example.com", username),
        username: username.to_string(),
        password: crate::auth::hash_password("secret123", 4).expect("fixture password hashes"),
        language: "es".to_string(),
        id_rol: role.id(),
    }
}
