//! Hosted UI customization of a user pool client.
//!
//! Settings kind: the stylesheet and logo of the hosted sign-in pages. The
//! service cannot clear a customization, so a reset writes the stock
//! stylesheet back.

use custom_cf_core::{Error, Result};
use custom_cf_reconciler::{Attributes, Properties, Resource};
use serde::{Deserialize, Serialize};

/// `ResourceType` of the UI customization kind.
pub const RESOURCE_TYPE: &str = "Custom::CognitoUserPoolUICustomization";

/// Client id that customizes every client of the pool.
pub const ALL_CLIENTS: &str = "ALL";

/// Stylesheet the hosted UI ships with.
pub const DEFAULT_CSS: &str = concat!(
    ".logo-customizable {max-width: 60%;max-height: 30%;}",
    ".banner-customizable {padding: 25px 0px 25px 0px;background-color: lightgray;}",
    ".label-customizable {font-weight: 400;}",
    ".textDescription-customizable {padding-top: 10px;padding-bottom: 10px;display: block;font-size: 16px;}",
    ".idpDescription-customizable {padding-top: 10px;padding-bottom: 10px;display: block;font-size: 16px;}",
    ".legalText-customizable {color: #747474;font-size: 11px;}",
    ".submitButton-customizable {font-size: 14px;font-weight: bold;margin: 20px 0px 10px 0px;height: 40px;width: 100%;color: #fff;background-color: #337ab7;}",
    ".submitButton-customizable:hover {color: #fff;background-color: #286090;}",
    ".errorMessage-customizable {padding: 5px;font-size: 14px;width: 100%;background: #F5F5F5;border: 2px solid #D64958;color: #D64958;}",
    ".inputField-customizable {width: 100%;height: 34px;color: #555;background-color: #fff;border: 1px solid #ccc;}",
    ".inputField-customizable:focus {border-color: #66afe9;outline: 0;}",
    ".idpButton-customizable {height: 40px;width: 100%;text-align: center;margin-bottom: 15px;color: #fff;background-color: #5bc0de;border-color: #46b8da;}",
    ".idpButton-customizable:hover {color: #fff;background-color: #31b0d5;}",
    ".socialButton-customizable {height: 40px;text-align: left;width: 100%;margin-bottom: 15px;}",
    ".redirect-customizable {text-align: center;}",
    ".passwordCheck-notValid-customizable {color: #DF3312;}",
    ".passwordCheck-valid-customizable {color: #19BF00;}",
    ".background-customizable {background-color: #fff;}",
);

/// Template properties of a UI customization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UiCustomization {
    #[serde(rename = "CSS")]
    pub css: String,
    pub client_id: String,
    /// Base64 encoded logo.
    pub image_file: String,
    pub user_pool_id: String,
}

impl UiCustomization {
    /// Customization the client is returned to when the resource goes away.
    pub fn defaults(user_pool_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            css: DEFAULT_CSS.to_string(),
            client_id: client_id.into(),
            image_file: String::new(),
            user_pool_id: user_pool_id.into(),
        }
    }

    /// Whether this customizes every client of the pool.
    pub fn is_pool_wide(&self) -> bool {
        self.client_id == ALL_CLIENTS
    }
}

/// Live customization as the backend reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiDescription {
    pub css_version: String,
    pub client_id: String,
    pub user_pool_id: String,
}

impl Properties for UiCustomization {
    const RESOURCE_TYPE: &'static str = RESOURCE_TYPE;

    fn identity_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("UserPoolId", &self.user_pool_id),
            ("ClientId", &self.client_id),
        ]
    }

    fn physical_id(&self) -> String {
        format!("{}-{}", self.user_pool_id, self.client_id)
    }

    fn validate(&self) -> Result<()> {
        if self.css.trim().is_empty() && self.image_file.trim().is_empty() {
            return Err(Error::invalid_field(
                "CSS",
                "either CSS or ImageFile must be set",
            ));
        }
        Ok(())
    }
}

impl Resource for UiCustomization {
    type Snapshot = UiDescription;

    fn name(&self) -> &str {
        &self.client_id
    }

    fn attributes(&self, snapshot: &UiDescription) -> Attributes {
        Attributes::from([
            ("CSSVersion".to_string(), snapshot.css_version.clone()),
            ("ClientId".to_string(), snapshot.client_id.clone()),
            ("UserPoolId".to_string(), snapshot.user_pool_id.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_customization() -> std::result::Result<(), serde_json::Error> {
        let ui: UiCustomization = serde_json::from_value(json!({
            "CSS": ".banner-customizable {background-color: black;}",
            "ClientId": "ALL",
            "UserPoolId": "pool"
        }))?;

        assert!(ui.is_pool_wide());
        assert_eq!(ui.physical_id(), "pool-ALL");
        assert_eq!(ui.validate(), Ok(()));
        Ok(())
    }

    #[test]
    fn test_needs_css_or_image() {
        let ui = UiCustomization {
            client_id: "7abc".to_string(),
            user_pool_id: "pool".to_string(),
            ..UiCustomization::default()
        };

        assert!(matches!(ui.validate(), Err(Error::InvalidField { .. })));
    }

    #[test]
    fn test_defaults_restore_stock_stylesheet() {
        let reset = UiCustomization::defaults("pool", "7abc");

        assert!(reset.css.starts_with(".logo-customizable {max-width: 60%;max-height: 30%;}"));
        assert!(reset.css.ends_with(".background-customizable {background-color: #fff;}"));
        assert!(reset.image_file.is_empty());
        assert_eq!(reset.validate(), Ok(()));
    }

    #[test]
    fn test_attributes() {
        let ui = UiCustomization::defaults("pool", "7abc");
        let attributes = ui.attributes(&UiDescription {
            css_version: "20240101".to_string(),
            client_id: "7abc".to_string(),
            user_pool_id: "pool".to_string(),
        });

        assert_eq!(attributes.get("CSSVersion").map(String::as_str), Some("20240101"));
        assert_eq!(attributes.len(), 3);
    }
}
