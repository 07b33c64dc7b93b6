use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Azure AD B2C settings of the application as used by the sign-in flow of the clients.
///
/// Optional settings that are not configured are left out of the serialized form,
/// thus a client receives exactly what was configured.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureAdB2C {
    /// The B2C login instance, ex: `https://contoso.b2clogin.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// The tenant domain, ex: `contoso.b2clogin.com`
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// The application (client) id registered in the tenant.
    pub client_id: String,
    /// The sign-up/sign-in user flow, ex: `B2C_1_signin`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_up_sign_in_policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_profile_policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_out_callback_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_authority: Option<bool>,
}

impl AzureAdB2C {
    pub fn new<D: Into<String>, C: Into<String>>(domain: D, client_id: C) -> Self {
        Self {
            instance: None,
            domain: domain.into(),
            tenant_id: None,
            client_id: client_id.into(),
            sign_up_sign_in_policy_id: None,
            reset_password_policy_id: None,
            edit_profile_policy_id: None,
            callback_path: None,
            signed_out_callback_path: None,
            redirect_uri: None,
            authority: None,
            validate_authority: None,
        }
    }

    pub fn with_sign_up_sign_in_policy<S: Into<String>>(self, policy: S) -> Self {
        Self {
            sign_up_sign_in_policy_id: Some(policy.into()),
            ..self
        }
    }
}
