use std::convert::Infallible;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use super::SubscriberEmail;

/// Raw JSON body of `POST /api/newsletter`.
///
/// Only a JSON object deserializes; a derived struct impl would also accept
/// an array (`["a@example.com"]`) positionally.
///
/// `email` is kept as a raw JSON value so that a missing key, `null`, or a
/// non-string all deserialize successfully and are rejected by `TryFrom`, with
/// the same error as an empty string.
#[derive(Debug, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct SubscriptionRequest {
    pub email: Option<Value>,
}

impl TryFrom<Map<String, Value>> for SubscriptionRequest {
    type Error = Infallible;
    fn try_from(mut body: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            email: body.remove("email"),
        })
    }
}

/// A subscription request that is ready to be forwarded to the provider.
#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
}

impl TryFrom<SubscriptionRequest> for NewSubscriber {
    type Error = String;
    fn try_from(value: SubscriptionRequest) -> Result<Self, Self::Error> {
        let email = match value.email {
            Some(Value::String(email)) => email,
            None | Some(Value::Null) => return Err("Email is missing".to_string()),
            Some(other) => return Err(format!("Email is not a string: {other}")),
        };
        let email = SubscriberEmail::parse(email)?;
        Ok(NewSubscriber { email })
    }
}
