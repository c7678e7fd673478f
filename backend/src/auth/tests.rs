use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;
use uuid::Uuid;

fn set_env_vars() {
    unsafe {
        env::set_var("AUTH_JWT_SECRET", "supersecretjwtsecretforunittesting123");
    }
}

#[test]
fn test_validate_identity_jwt_success() {
    set_env_vars();
    let secret = "supersecretjwtsecretforunittesting123";
    let my_claims = IdentityClaims {
        sub: Uuid::new_v4().to_string(),
        exp: 9999999999, // far future
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    let claims = validate_identity_jwt(&token).expect("Valid token should pass");
    assert_eq!(claims.sub, my_claims.sub);
}

#[test]
fn test_validate_identity_jwt_expired() {
    set_env_vars();
    let secret = "supersecretjwtsecretforunittesting123";
    let my_claims = IdentityClaims {
        sub: Uuid::new_v4().to_string(),
        exp: 1, // past
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    let result = validate_identity_jwt(&token);
    assert!(result.is_err());
}

#[test]
fn test_validate_identity_jwt_invalid_signature() {
    set_env_vars();
    let secret = "wrongsecret";
    let my_claims = IdentityClaims {
        sub: Uuid::new_v4().to_string(),
        exp: 9999999999,
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    let result = validate_identity_jwt(&token);
    assert!(result.is_err());
}
