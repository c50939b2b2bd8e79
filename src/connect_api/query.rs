//! Query string assembly for list endpoints
//!
//! Every list endpoint accepts the same parameter families: sparse fieldsets
//! (`fields[<resource>]`), filters (`filter[<field>]`), `include`, `limit`,
//! relationship limits (`limit[<relationship>]`) and `sort`. Each query type
//! declares a table mapping its fields to parameters; [`ToQueryString`] turns
//! that table into `name=value` pairs joined by `&`, skipping empty strings and
//! zero limits. Values are percent-encoded; bracketed names are written as is.

use crate::connect_api::resources::{
    CertificateType, DeviceStatus, Platform, ProfileState, ProfileType,
};
use std::fmt;

/// Query parameter name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// `fields[<resource>]`
    Fields(&'static str),
    /// `filter[<field>]`
    Filter(&'static str),
    Include,
    Limit,
    /// `limit[<relationship>]`
    LimitOf(&'static str),
    Sort,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Fields(resource) => write!(f, "fields[{}]", resource),
            Param::Filter(field) => write!(f, "filter[{}]", field),
            Param::Include => write!(f, "include"),
            Param::Limit => write!(f, "limit"),
            Param::LimitOf(relationship) => write!(f, "limit[{}]", relationship),
            Param::Sort => write!(f, "sort"),
        }
    }
}

/// Value bound to a [`Param`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue<'a> {
    Text(&'a str),
    Count(u32),
}

/// Ordered set of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter unless the value is empty or zero
    pub fn push(&mut self, param: Param, value: ParamValue<'_>) -> &mut Self {
        match value {
            ParamValue::Text(text) if !text.is_empty() => {
                self.pairs.push((param.to_string(), text.to_string()));
            }
            ParamValue::Count(count) if count > 0 => {
                self.pairs.push((param.to_string(), count.to_string()));
            }
            _ => {}
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", name, urlencoding::encode(value))?;
        }
        Ok(())
    }
}

/// A list query that can be rendered as a query string
pub trait ToQueryString {
    /// Field-to-parameter table, in declaration order
    fn params(&self) -> Vec<(Param, ParamValue<'_>)>;

    fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for (param, value) in self.params() {
            params.push(param, value);
        }
        params
    }

    fn query_string(&self) -> String {
        self.query_params().to_string()
    }
}

/// Append `?<query>` to `url` when the query renders to something
pub fn url_with_query<Q: ToQueryString>(url: String, query: Option<&Q>) -> String {
    match query.map(|q| q.query_string()) {
        Some(qs) if !qs.is_empty() => format!("{}?{}", url, qs),
        _ => url,
    }
}

/// Query for `GET /v1/bundleIds`
///
/// Multi-valued fields take comma-separated lists, as the API expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBundlesQuery {
    /// bundleIdCapabilities, identifier, name, platform, profiles, seedId
    pub fields_bundle_ids: String,
    /// bundleId, certificates, createdDate, devices, expirationDate, name, platform, profileContent, profileState, profileType, uuid
    pub fields_profiles: String,
    pub id: String,
    pub identifier: String,
    pub name: String,
    /// IOS, MAC_OS
    pub platform: String,
    pub seed_id: String,
    /// bundleIdCapabilities, profiles
    pub include: String,
    /// Maximum 200
    pub limit: u32,
    /// Maximum 50
    pub limit_profiles: u32,
    /// id, -id, name, -name, platform, -platform, seedId, -seedId
    pub sort: String,
    /// bundleId, capabilityType, settings
    pub fields_bundle_id_capabilities: String,
}

impl ListBundlesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform.as_str().to_string();
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = include.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }
}

impl ToQueryString for ListBundlesQuery {
    fn params(&self) -> Vec<(Param, ParamValue<'_>)> {
        use ParamValue::{Count, Text};
        vec![
            (Param::Fields("bundleIds"), Text(&self.fields_bundle_ids)),
            (Param::Fields("profiles"), Text(&self.fields_profiles)),
            (Param::Filter("id"), Text(&self.id)),
            (Param::Filter("identifier"), Text(&self.identifier)),
            (Param::Filter("name"), Text(&self.name)),
            (Param::Filter("platform"), Text(&self.platform)),
            (Param::Filter("seedId"), Text(&self.seed_id)),
            (Param::Include, Text(&self.include)),
            (Param::Limit, Count(self.limit)),
            (Param::LimitOf("profiles"), Count(self.limit_profiles)),
            (Param::Sort, Text(&self.sort)),
            (
                Param::Fields("bundleIdCapabilities"),
                Text(&self.fields_bundle_id_capabilities),
            ),
        ]
    }
}

/// Query for `GET /v1/certificates`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCertificatesQuery {
    /// certificateContent, certificateType, csrContent, displayName, expirationDate, name, platform, serialNumber
    pub fields_certificates: String,
    pub id: String,
    pub serial_number: String,
    /// Maximum 200
    pub limit: u32,
    /// certificateType, -certificateType, displayName, -displayName, id, -id, serialNumber, -serialNumber
    pub sort: String,
    pub certificate_type: String,
    pub display_name: String,
}

impl ListCertificatesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_certificate_type(mut self, certificate_type: CertificateType) -> Self {
        self.certificate_type = certificate_type.as_str().to_string();
        self
    }

    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = serial_number.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl ToQueryString for ListCertificatesQuery {
    fn params(&self) -> Vec<(Param, ParamValue<'_>)> {
        use ParamValue::{Count, Text};
        vec![
            (Param::Fields("certificates"), Text(&self.fields_certificates)),
            (Param::Filter("id"), Text(&self.id)),
            (Param::Filter("serialNumber"), Text(&self.serial_number)),
            (Param::Limit, Count(self.limit)),
            (Param::Sort, Text(&self.sort)),
            (Param::Filter("certificateType"), Text(&self.certificate_type)),
            (Param::Filter("displayName"), Text(&self.display_name)),
        ]
    }
}

/// Query for `GET /v1/devices`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDevicesQuery {
    /// addedDate, deviceClass, model, name, platform, status, udid
    pub fields_devices: String,
    pub id: String,
    pub name: String,
    pub platform: String,
    /// ENABLED, DISABLED
    pub status: String,
    pub udid: String,
    /// Maximum 200
    pub limit: u32,
    /// id, -id, name, -name, platform, -platform, status, -status, udid, -udid
    pub sort: String,
}

impl ListDevicesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_udid(mut self, udid: impl Into<String>) -> Self {
        self.udid = udid.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform.as_str().to_string();
        self
    }

    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.status = status.as_str().to_string();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl ToQueryString for ListDevicesQuery {
    fn params(&self) -> Vec<(Param, ParamValue<'_>)> {
        use ParamValue::{Count, Text};
        vec![
            (Param::Fields("devices"), Text(&self.fields_devices)),
            (Param::Filter("id"), Text(&self.id)),
            (Param::Filter("name"), Text(&self.name)),
            (Param::Filter("platform"), Text(&self.platform)),
            (Param::Filter("status"), Text(&self.status)),
            (Param::Filter("udid"), Text(&self.udid)),
            (Param::Limit, Count(self.limit)),
            (Param::Sort, Text(&self.sort)),
        ]
    }
}

/// Query for `GET /v1/profiles`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListProfilesQuery {
    pub fields_certificates: String,
    pub fields_devices: String,
    pub fields_profiles: String,
    pub id: String,
    pub name: String,
    /// bundleId, certificates, devices
    pub include: String,
    /// Maximum 200
    pub limit: u32,
    /// Maximum 50
    pub limit_certificates: u32,
    /// Maximum 50
    pub limit_devices: u32,
    /// id, -id, name, -name, profileState, -profileState, profileType, -profileType
    pub sort: String,
    pub fields_bundle_ids: String,
    /// ACTIVE, INVALID
    pub profile_state: String,
    pub profile_type: String,
}

impl ListProfilesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = include.into();
        self
    }

    pub fn with_profile_state(mut self, state: ProfileState) -> Self {
        self.profile_state = state.as_str().to_string();
        self
    }

    pub fn with_profile_type(mut self, profile_type: ProfileType) -> Self {
        self.profile_type = profile_type.as_str().to_string();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl ToQueryString for ListProfilesQuery {
    fn params(&self) -> Vec<(Param, ParamValue<'_>)> {
        use ParamValue::{Count, Text};
        vec![
            (Param::Fields("certificates"), Text(&self.fields_certificates)),
            (Param::Fields("devices"), Text(&self.fields_devices)),
            (Param::Fields("profiles"), Text(&self.fields_profiles)),
            (Param::Filter("id"), Text(&self.id)),
            (Param::Filter("name"), Text(&self.name)),
            (Param::Include, Text(&self.include)),
            (Param::Limit, Count(self.limit)),
            (Param::LimitOf("certificates"), Count(self.limit_certificates)),
            (Param::LimitOf("devices"), Count(self.limit_devices)),
            (Param::Sort, Text(&self.sort)),
            (Param::Fields("bundleIds"), Text(&self.fields_bundle_ids)),
            (Param::Filter("profileState"), Text(&self.profile_state)),
            (Param::Filter("profileType"), Text(&self.profile_type)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundles_name_and_limit() {
        let query = ListBundlesQuery {
            name: "Foo".to_string(),
            limit: 10,
            ..Default::default()
        };
        assert_eq!(query.query_string(), "filter[name]=Foo&limit=10");
    }

    #[test]
    fn test_empty_query_renders_nothing() {
        assert_eq!(ListBundlesQuery::default().query_string(), "");
        assert_eq!(ListProfilesQuery::default().query_string(), "");
        assert!(ListDevicesQuery::default().query_params().is_empty());
    }

    #[test]
    fn test_bundles_declaration_order() {
        let query = ListBundlesQuery {
            fields_bundle_ids: "name,platform".to_string(),
            platform: "IOS".to_string(),
            include: "profiles".to_string(),
            limit_profiles: 5,
            sort: "-name".to_string(),
            fields_bundle_id_capabilities: "settings".to_string(),
            ..Default::default()
        };
        assert_eq!(
            query.query_string(),
            "fields[bundleIds]=name%2Cplatform&filter[platform]=IOS&include=profiles\
             &limit[profiles]=5&sort=-name&fields[bundleIdCapabilities]=settings"
        );
    }

    #[test]
    fn test_certificates_type_filter_after_sort() {
        let query = ListCertificatesQuery::new()
            .with_limit(20)
            .with_certificate_type(CertificateType::IosDistribution);
        assert_eq!(
            query.query_string(),
            "limit=20&filter[certificateType]=IOS_DISTRIBUTION"
        );
    }

    #[test]
    fn test_devices_builder() {
        let query = ListDevicesQuery::new()
            .with_platform(Platform::Ios)
            .with_status(DeviceStatus::Enabled)
            .with_udid("00008030-000A1234");
        assert_eq!(
            query.query_string(),
            "filter[platform]=IOS&filter[status]=ENABLED&filter[udid]=00008030-000A1234"
        );
    }

    #[test]
    fn test_profiles_relationship_limits() {
        let query = ListProfilesQuery {
            include: "certificates,devices".to_string(),
            limit_certificates: 10,
            limit_devices: 50,
            ..Default::default()
        }
        .with_profile_state(ProfileState::Active);
        assert_eq!(
            query.query_string(),
            "include=certificates%2Cdevices&limit[certificates]=10&limit[devices]=50\
             &filter[profileState]=ACTIVE"
        );
    }

    #[test]
    fn test_zero_limit_is_skipped() {
        let mut params = QueryParams::new();
        params
            .push(Param::Limit, ParamValue::Count(0))
            .push(Param::Sort, ParamValue::Text(""))
            .push(Param::Include, ParamValue::Text("profiles"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.to_string(), "include=profiles");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let query = ListBundlesQuery::new().with_name("R&D #1").with_limit(10);
        assert_eq!(
            query.query_string(),
            "filter[name]=R%26D%20%231&limit=10"
        );

        let params = query.query_params();
        assert_eq!(params.iter().next(), Some(("filter[name]", "R&D #1")));
    }

    #[test]
    fn test_url_with_query() {
        let base = "https://api.example.com/v1/devices".to_string();
        let empty = ListDevicesQuery::default();
        assert_eq!(url_with_query(base.clone(), Some(&empty)), base);
        assert_eq!(url_with_query::<ListDevicesQuery>(base.clone(), None), base);

        let query = ListDevicesQuery::new().with_limit(3);
        assert_eq!(
            url_with_query(base.clone(), Some(&query)),
            format!("{}?limit=3", base)
        );
    }
}
