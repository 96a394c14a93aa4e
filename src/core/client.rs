//! Blocking REST client for the InvenTree API
//!
//! One request at a time, token auth, per-request timeout. Every failure
//! maps into [`RegistryError`] so callers can apply the degrade-don't-abort
//! policy uniformly.

use std::collections::BTreeSet;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::config::ApiConfig;
use crate::core::registry::{EnumerationSource, ParameterStore, RegistryError, TemplateSource};
use crate::entities::{
    CategoryId, NewPart, NewStockLocation, ParameterTemplate, ParameterValue, Part, PartId,
    SelectionList, SelectionListId, SelectionListPayload, StockLocation, TemplateId,
};

/// Blocking client bound to one InvenTree server
pub struct InvenTreeClient {
    http: Client,
    base_url: String,
}

impl InvenTreeClient {
    pub fn new(api: &ApiConfig) -> Result<Self, RegistryError> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("Token {}", api.token))
            .map_err(|_| RegistryError::Transport("API token contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, token);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(api.timeout)
            .build()
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&api.base_url),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RegistryError> {
        let response = request
            .send()
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| RegistryError::Payload(e.to_string()))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RegistryError> {
        self.send(self.http.get(self.url(path)))
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, RegistryError> {
        self.send(self.http.post(self.url(path)).json(body))
    }

    fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, RegistryError> {
        self.send(self.http.put(self.url(path)).json(body))
    }

    // --- parts ---

    pub fn parts_in_category(&self, category: CategoryId) -> Result<Vec<Part>, RegistryError> {
        self.get(&format!("part/?category={}", category))
    }

    pub fn create_part(&self, part: &NewPart) -> Result<Part, RegistryError> {
        self.post("part/", part)
    }

    // --- parameter templates and values ---

    pub fn category_templates(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ParameterTemplate>, RegistryError> {
        let records: Vec<CategoryParameterRecord> =
            self.get(&format!("part/category/parameters/?category={}", category))?;
        Ok(records.into_iter().map(CategoryParameterRecord::into_template).collect())
    }

    pub fn part_parameters(&self, part: PartId) -> Result<Vec<ParameterValue>, RegistryError> {
        self.get(&format!("part/parameter/?part={}", part))
    }

    /// The existing assignment for (part, template), if any
    pub fn part_parameter(
        &self,
        part: PartId,
        template: TemplateId,
    ) -> Result<Option<ParameterValue>, RegistryError> {
        let matches: Vec<ParameterValue> =
            self.get(&format!("part/parameter/?part={}&template={}", part, template))?;
        Ok(matches.into_iter().next())
    }

    pub fn create_part_parameter(
        &self,
        part: PartId,
        template: TemplateId,
        data: &str,
    ) -> Result<ParameterValue, RegistryError> {
        self.post(
            "part/parameter/",
            &ParameterPayload {
                part,
                template,
                data: data.to_string(),
            },
        )
    }

    pub fn update_part_parameter(
        &self,
        pk: i64,
        part: PartId,
        template: TemplateId,
        data: &str,
    ) -> Result<ParameterValue, RegistryError> {
        self.put(
            &format!("part/parameter/{}/", pk),
            &ParameterPayload {
                part,
                template,
                data: data.to_string(),
            },
        )
    }

    // --- selection lists ---

    pub fn selection_lists(&self) -> Result<Vec<SelectionList>, RegistryError> {
        self.get("selection/")
    }

    pub fn selection_list(&self, pk: SelectionListId) -> Result<SelectionList, RegistryError> {
        self.get(&format!("selection/{}/", pk))
    }

    pub fn create_selection_list(
        &self,
        payload: &SelectionListPayload,
    ) -> Result<SelectionList, RegistryError> {
        self.post("selection/", payload)
    }

    pub fn update_selection_list(
        &self,
        pk: SelectionListId,
        payload: &SelectionListPayload,
    ) -> Result<SelectionList, RegistryError> {
        self.put(&format!("selection/{}/", pk), payload)
    }

    // --- stock locations ---

    pub fn stock_locations(&self) -> Result<Vec<StockLocation>, RegistryError> {
        self.get("stock/location/")
    }

    pub fn create_stock_location(
        &self,
        location: &NewStockLocation,
    ) -> Result<StockLocation, RegistryError> {
        self.post("stock/location/", location)
    }
}

impl EnumerationSource for InvenTreeClient {
    fn enumeration_values(&self, list: SelectionListId) -> Result<BTreeSet<String>, RegistryError> {
        let list = self.selection_list(list)?;
        Ok(list.values().into_iter().map(str::to_string).collect())
    }
}

impl TemplateSource for InvenTreeClient {
    fn templates_for_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ParameterTemplate>, RegistryError> {
        self.category_templates(category)
    }
}

impl ParameterStore for InvenTreeClient {
    fn assignments_for_part(&self, part: PartId) -> Result<Vec<ParameterValue>, RegistryError> {
        self.part_parameters(part)
    }

    fn create_assignment(
        &self,
        part: PartId,
        template: TemplateId,
        value: &str,
    ) -> Result<(), RegistryError> {
        self.create_part_parameter(part, template, value).map(|_| ())
    }
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    format!("{}/", trimmed)
}

#[derive(Debug, Serialize)]
struct ParameterPayload {
    part: PartId,
    template: TemplateId,
    data: String,
}

/// Wire shape of `GET part/category/parameters/`
#[derive(Debug, Deserialize)]
struct CategoryParameterRecord {
    parameter_template: TemplateId,
    parameter_template_detail: TemplateDetail,

    #[serde(default)]
    default_value: String,
}

#[derive(Debug, Deserialize)]
struct TemplateDetail {
    name: String,

    #[serde(default)]
    selectionlist: Option<SelectionListId>,

    #[serde(default)]
    checkbox: bool,
}

impl CategoryParameterRecord {
    fn into_template(self) -> ParameterTemplate {
        ParameterTemplate {
            template: self.parameter_template,
            name: self.parameter_template_detail.name,
            default_value: self.default_value,
            selection_list: self.parameter_template_detail.selectionlist,
            checkbox: self.parameter_template_detail.checkbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_always_ends_with_one_slash() {
        assert_eq!(
            normalize_base_url("https://inv.example/api"),
            "https://inv.example/api/"
        );
        assert_eq!(
            normalize_base_url("https://inv.example/api//"),
            "https://inv.example/api/"
        );
    }

    #[test]
    fn test_category_parameter_record_maps_to_template() {
        let json = r#"{
            "parameter_template": 12,
            "parameter_template_detail": {
                "name": "Tolerance",
                "selectionlist": 9,
                "checkbox": false
            },
            "default_value": "1%"
        }"#;
        let record: CategoryParameterRecord = serde_json::from_str(json).unwrap();
        let template = record.into_template();
        assert_eq!(template.template, TemplateId(12));
        assert_eq!(template.name, "Tolerance");
        assert_eq!(template.selection_list, Some(SelectionListId(9)));
        assert_eq!(template.default_value, "1%");
    }

    #[test]
    fn test_category_parameter_record_tolerates_null_selection() {
        let json = r#"{
            "parameter_template": 4,
            "parameter_template_detail": {"name": "RoHS", "selectionlist": null, "checkbox": true}
        }"#;
        let record: CategoryParameterRecord = serde_json::from_str(json).unwrap();
        let template = record.into_template();
        assert!(template.selection_list.is_none());
        assert!(template.checkbox);
        assert_eq!(template.default_value, "");
    }
}
