//! Request envelope construction
//!
//! The request is assembled as a typed [`XmlElement`] tree and serialized by
//! the escaping writer in `idempiere-ws-types`. Nothing is spliced into a
//! text template, so no parameter, column name or credential can add nodes
//! to the document.

use idempiere_ws_types::{
    Parameter, TruncationAdvisory, UserContext, WsError, WsResult, XmlElement,
};
use serde_json::Value;

/// Path of the ADInterface SOAP service below the server URL
pub const SERVICE_PATH: &str = "/ADInterface/services/ModelADService";

/// SOAP 1.1 envelope namespace
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// ADInterface vendor namespace
pub const ADINTERFACE_NS: &str = "http://idempiere.org/ADInterface/1_0";

pub const DEFAULT_LOCALE: &str = "es_EC";

const SOAP_PREFIX: &str = "soapenv";
const VENDOR_PREFIX: &str = "_0";
const LOGIN_STAGE: i64 = 0;

/// Everything needed to send one run-process request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    endpoint: String,
    document: String,
    advisories: Vec<TruncationAdvisory>,
}

impl RequestEnvelope {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Parameters whose rendered value is longer than the remote column
    pub fn advisories(&self) -> &[TruncationAdvisory] {
        &self.advisories
    }

    pub fn into_parts(self) -> (String, String, Vec<TruncationAdvisory>) {
        (self.endpoint, self.document, self.advisories)
    }
}

/// Builds run-process envelopes for a fixed login locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeBuilder {
    locale: String,
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Build from typed inputs. Only a parameter without a column name is
    /// rejected; the context was validated when it was created.
    pub fn build(
        &self,
        server: &str,
        process_name: &str,
        ctx: &UserContext,
        params: &[Parameter],
    ) -> WsResult<RequestEnvelope> {
        if let Some(index) = params.iter().position(|param| param.column.is_empty()) {
            return Err(WsError::InvalidParameterList(format!(
                "entry {} has no column name",
                index
            )));
        }

        let advisories = params
            .iter()
            .filter_map(Parameter::truncation_advisory)
            .collect();

        Ok(RequestEnvelope {
            endpoint: endpoint_url(server),
            document: self.document(process_name, ctx, params).to_xml_string(),
            advisories,
        })
    }

    /// Validate loosely-typed context and parameters, then build.
    ///
    /// Context problems are reported before parameter problems; both are
    /// reported before anything is constructed.
    pub fn build_from_value(
        &self,
        server: &str,
        process_name: &str,
        ctx: &Value,
        params: &Value,
    ) -> WsResult<RequestEnvelope> {
        let ctx = UserContext::from_value(ctx)?;
        let params = Parameter::list_from_value(params)?;
        self.build(server, process_name, &ctx, &params)
    }

    fn document(&self, process_name: &str, ctx: &UserContext, params: &[Parameter]) -> XmlElement {
        let fields = params.iter().map(|param| {
            vendor("field")
                .with_attribute("column", param.column.as_str())
                .with_child(vendor("val").with_text(param.rendered()))
        });

        let run_process = vendor("ModelRunProcess")
            .with_child(vendor("serviceType").with_text(process_name))
            .with_child(vendor("ParamValues").with_children(fields));

        let login = vendor("ADLoginRequest").with_children([
            vendor("user").with_text(ctx.username()),
            vendor("pass").with_text(ctx.password()),
            vendor("lang").with_text(self.locale.as_str()),
            identifier("ClientID", ctx.client_id()),
            identifier("RoleID", ctx.role_id().unwrap_or(0)),
            identifier("OrgID", ctx.org_id()),
            identifier("WarehouseID", ctx.warehouse_id().unwrap_or(0)),
            identifier("stage", LOGIN_STAGE),
        ]);

        let request = vendor("runProcess").with_child(
            vendor("ModelRunProcessRequest")
                .with_child(run_process)
                .with_child(login),
        );

        soap("Envelope")
            .with_attribute(format!("xmlns:{}", SOAP_PREFIX), SOAP_ENVELOPE_NS)
            .with_attribute(format!("xmlns:{}", VENDOR_PREFIX), ADINTERFACE_NS)
            .with_child(soap("Header"))
            .with_child(soap("Body").with_child(request))
    }
}

/// Build with the default locale.
pub fn build(
    server: &str,
    process_name: &str,
    ctx: &UserContext,
    params: &[Parameter],
) -> WsResult<RequestEnvelope> {
    EnvelopeBuilder::default().build(server, process_name, ctx, params)
}

/// Validate and build with the default locale.
pub fn build_from_value(
    server: &str,
    process_name: &str,
    ctx: &Value,
    params: &Value,
) -> WsResult<RequestEnvelope> {
    EnvelopeBuilder::default().build_from_value(server, process_name, ctx, params)
}

/// `<server>/ADInterface/services/ModelADService`, ignoring trailing slashes
pub fn endpoint_url(server: &str) -> String {
    format!("{}{}", server.trim_end_matches('/'), SERVICE_PATH)
}

fn soap(local: &str) -> XmlElement {
    XmlElement::new(format!("{}:{}", SOAP_PREFIX, local))
}

fn vendor(local: &str) -> XmlElement {
    XmlElement::new(format!("{}:{}", VENDOR_PREFIX, local))
}

fn identifier(local: &str, id: i64) -> XmlElement {
    vendor(local).with_text(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> UserContext {
        UserContext::new("SuperUser", "System", 11, 11)
            .unwrap()
            .with_role(102)
    }

    fn parsed(envelope: &RequestEnvelope) -> XmlElement {
        XmlElement::parse(envelope.document()).expect("envelope must be well-formed")
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("https://erp.example.com/"),
            "https://erp.example.com/ADInterface/services/ModelADService"
        );
        assert_eq!(
            endpoint_url("http://erp:8080"),
            "http://erp:8080/ADInterface/services/ModelADService"
        );
    }

    #[test]
    fn test_document_structure() {
        let params = vec![
            Parameter::new("C_Order_ID", 1000123),
            Parameter::new("DocAction", "CO"),
        ];
        let envelope = build("http://erp:8080", "CompleteOrder", &ctx(), &params).unwrap();
        let doc = parsed(&envelope);

        assert_eq!(doc.name, "soapenv:Envelope");
        assert_eq!(doc.attribute("soapenv"), Some(SOAP_ENVELOPE_NS));
        assert_eq!(doc.attribute("_0"), Some(ADINTERFACE_NS));
        assert!(doc.child("Header").is_some());

        let request = doc
            .select(&["Envelope", "Body", "runProcess", "ModelRunProcessRequest"])
            .unwrap();
        let run = request.child("ModelRunProcess").unwrap();
        assert_eq!(run.child("serviceType").unwrap().text(), "CompleteOrder");

        let fields: Vec<(&str, &str)> = run
            .child("ParamValues")
            .unwrap()
            .children_named("field")
            .map(|f| (f.attribute("column").unwrap(), f.child("val").unwrap().text()))
            .collect();
        assert_eq!(fields, vec![("C_Order_ID", "1000123"), ("DocAction", "CO")]);

        let login = request.child("ADLoginRequest").unwrap();
        let text = |name: &str| login.child(name).unwrap().text().to_string();
        assert_eq!(text("user"), "SuperUser");
        assert_eq!(text("pass"), "System");
        assert_eq!(text("lang"), "es_EC");
        assert_eq!(text("ClientID"), "11");
        assert_eq!(text("RoleID"), "102");
        assert_eq!(text("OrgID"), "11");
        assert_eq!(text("WarehouseID"), "0");
        assert_eq!(text("stage"), "0");
    }

    #[test]
    fn test_absent_role_defaults_to_zero() {
        let ctx = UserContext::new("u", "p", 11, 0).unwrap().with_warehouse(50);
        let doc = parsed(&build("http://erp", "P", &ctx, &[]).unwrap());
        let login = doc
            .select(&["Envelope", "Body", "runProcess", "ModelRunProcessRequest", "ADLoginRequest"])
            .unwrap();
        assert_eq!(login.child("RoleID").unwrap().text(), "0");
        assert_eq!(login.child("WarehouseID").unwrap().text(), "50");
    }

    #[test]
    fn test_null_value_renders_empty_field() {
        let params = vec![Parameter::new("DateFrom", None::<String>)];
        let envelope = build("http://erp", "P", &ctx(), &params).unwrap();
        assert!(envelope.document().contains(r#"<_0:field column="DateFrom"><_0:val/></_0:field>"#));
    }

    #[test]
    fn test_markup_in_values_and_credentials_is_inert() {
        let ctx = UserContext::new("admin</_0:user><_0:user>root", "p&ss\"<'", 11, 0).unwrap();
        let params = vec![Parameter::new(
            "Name\"><_0:field column=\"Injected",
            "</_0:val></_0:field><_0:field column=\"X\"><_0:val>1",
        )];
        let doc = parsed(&build("http://erp", "P", &ctx, &params).unwrap());

        let request = doc
            .select(&["Envelope", "Body", "runProcess", "ModelRunProcessRequest"])
            .unwrap();
        let fields: Vec<&XmlElement> = request
            .child("ModelRunProcess")
            .unwrap()
            .child("ParamValues")
            .unwrap()
            .children_named("field")
            .collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields[0].attribute("column"),
            Some("Name\"><_0:field column=\"Injected")
        );
        assert_eq!(
            fields[0].child("val").unwrap().text(),
            "</_0:val></_0:field><_0:field column=\"X\"><_0:val>1"
        );

        let login = request.child("ADLoginRequest").unwrap();
        assert_eq!(login.children_named("user").count(), 1);
        assert_eq!(login.child("user").unwrap().text(), "admin</_0:user><_0:user>root");
        assert_eq!(login.child("pass").unwrap().text(), "p&ss\"<'");
    }

    #[test]
    fn test_advisories_do_not_block_build() {
        let params = vec![
            Parameter::new("Short", "ok"),
            Parameter::new("Description", "d".repeat(300)),
        ];
        let envelope = build("http://erp", "P", &ctx(), &params).unwrap();
        assert_eq!(envelope.advisories().len(), 1);
        assert_eq!(envelope.advisories()[0].column, "Description");
        assert_eq!(envelope.advisories()[0].length, 300);
        // full value is still sent
        assert!(envelope.document().contains(&"d".repeat(300)));
    }

    #[test]
    fn test_locale_override() {
        let envelope = EnvelopeBuilder::new()
            .with_locale("en_US")
            .build("http://erp", "P", &ctx(), &[])
            .unwrap();
        assert!(envelope.document().contains("<_0:lang>en_US</_0:lang>"));
    }

    #[test]
    fn test_build_from_value_validation_order() {
        let err = build_from_value("http://erp", "P", &json!("nope"), &json!("nope")).unwrap_err();
        assert!(matches!(err, WsError::InvalidContext(_)));

        let err = build_from_value(
            "http://erp",
            "P",
            &json!({"password": "p", "ad_client_id": 11, "ad_org_id": 0}),
            &json!([]),
        )
        .unwrap_err();
        assert!(matches!(err, WsError::MissingCredential(_)));

        let err = build_from_value(
            "http://erp",
            "P",
            &json!({"username": "u", "password": "p", "ad_client_id": "x", "ad_org_id": 0}),
            &json!([]),
        )
        .unwrap_err();
        assert!(matches!(err, WsError::MissingIdentifier(_)));

        let err = build_from_value(
            "http://erp",
            "P",
            &json!({"username": "u", "password": "p", "ad_client_id": 11, "ad_org_id": 0}),
            &json!({"column": "x"}),
        )
        .unwrap_err();
        assert!(matches!(err, WsError::InvalidParameterList(_)));
    }

    #[test]
    fn test_typed_build_rejects_empty_column() {
        let params = vec![Parameter::new("A", 1), Parameter::new("", "x")];
        let err = build("http://erp", "P", &ctx(), &params).unwrap_err();
        assert_eq!(err, WsError::InvalidParameterList("entry 1 has no column name".into()));
    }
}
