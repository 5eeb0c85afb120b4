//! [`Backend`] over the REST JSON API

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::crm::*;
use crate::ledger::invoice::InvoiceDocument;
use crate::reports::{DashboardMetrics, InvoiceSummary};
use crate::traits::*;
use crate::types::*;

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastNumber {
    #[serde(default)]
    last_number: u64,
}

fn document_base(kind: DocumentKind) -> DeskResult<&'static str> {
    match kind {
        DocumentKind::Journal => Ok("/api/manual-journals/"),
        DocumentKind::Expense => Ok("/api/expenses/"),
        DocumentKind::Invoice => Err(DeskError::Validation(
            "invoices use the invoice endpoints".to_string(),
        )),
    }
}

/// Backend reached over HTTP.
///
/// Every call is a single request: no retries, no auth, no pagination. Any
/// non-2xx response becomes [`DeskError::Backend`] carrying the body's
/// `error` or `message` field when present.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    api: ApiConfig,
}

impl HttpBackend {
    pub fn new(api: &ApiConfig) -> DeskResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = api.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DeskError::Config(format!("could not build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api: api.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> DeskResult<String> {
        let url = self.api.endpoint(path);
        debug!(method = %method, path, "backend request");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, path, error = %e, "backend unreachable");
            DeskError::Transport(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DeskError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(status, &text);
            warn!(method = %method, path, status = status.as_u16(), %message, "backend rejected request");
            return Err(DeskError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> DeskResult<T> {
        let text = self.send::<()>(Method::GET, path, None).await?;
        decode(&text)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> DeskResult<T> {
        let text = self.send(method, path, Some(body)).await?;
        decode(&text)
    }

    async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> DeskResult<()> {
        self.send(method, path, body).await.map(|_| ())
    }

    async fn delete(&self, path: &str) -> DeskResult<()> {
        self.send_unit::<()>(Method::DELETE, path, None).await
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> DeskResult<T> {
    serde_json::from_str(text).map_err(|e| DeskError::Decode(e.to_string()))
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

/// The document endpoints do not echo the kind back, so stamp it on before decoding
fn decode_document(mut value: Value, kind: DocumentKind) -> DeskResult<LedgerDocument> {
    if let Value::Object(map) = &mut value {
        map.entry("kind")
            .or_insert_with(|| Value::String(kind.to_string()));
    }
    serde_json::from_value(value).map_err(|e| DeskError::Decode(e.to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_leads(&self) -> DeskResult<Vec<Lead>> {
        self.get("/api/leads/").await
    }

    async fn add_lead(&mut self, lead: &Lead) -> DeskResult<Lead> {
        self.send_json(Method::POST, "/api/leads/add/", lead).await
    }

    async fn edit_lead(&mut self, lead: &Lead) -> DeskResult<()> {
        self.send_unit(Method::POST, "/api/edit/", Some(lead)).await
    }

    async fn delete_lead(&mut self, lead_id: u64) -> DeskResult<()> {
        self.delete(&format!("/api/leads/{}/delete/", lead_id)).await
    }

    async fn convert_lead(&mut self, lead_id: u64) -> DeskResult<Customer> {
        let text = self
            .send::<()>(Method::POST, &format!("/api/leads/{}/convert/", lead_id), None)
            .await?;
        decode(&text)
    }

    async fn list_customers(&self) -> DeskResult<Vec<Customer>> {
        self.get("/api/customers/").await
    }

    async fn add_customer(&mut self, customer: &Customer) -> DeskResult<Customer> {
        self.send_json(Method::POST, "/api/customers/add/", customer).await
    }

    async fn edit_customer(&mut self, customer: &Customer) -> DeskResult<()> {
        self.send_unit(Method::POST, "/api/customers/edit/", Some(customer))
            .await
    }

    async fn delete_customer(&mut self, customer_id: u64) -> DeskResult<()> {
        self.delete(&format!("/api/customers/{}/delete/", customer_id))
            .await
    }

    async fn list_vendors(&self) -> DeskResult<Vec<Vendor>> {
        self.get("/api/vendors/").await
    }

    async fn add_vendor(&mut self, vendor: &Vendor) -> DeskResult<Vendor> {
        self.send_json(Method::POST, "/api/vendors/add/", vendor).await
    }

    async fn edit_vendor(&mut self, vendor: &Vendor) -> DeskResult<()> {
        self.send_unit(Method::POST, "/api/vendors/edit/", Some(vendor))
            .await
    }

    async fn delete_vendor(&mut self, vendor_id: u64) -> DeskResult<()> {
        self.delete(&format!("/api/vendors/{}/delete/", vendor_id))
            .await
    }

    async fn list_invoices(&self) -> DeskResult<Vec<InvoiceDocument>> {
        self.get("/api/invoices/").await
    }

    async fn add_invoice(&mut self, invoice: &InvoiceDocument) -> DeskResult<InvoiceDocument> {
        self.send_json(Method::POST, "/api/invoices/add/", invoice).await
    }

    async fn edit_invoice(&mut self, invoice: &InvoiceDocument) -> DeskResult<()> {
        self.send_unit(Method::POST, "/api/invoices/edit/", Some(invoice))
            .await
    }

    async fn delete_invoice(&mut self, invoice_id: u64) -> DeskResult<()> {
        self.delete(&format!("/api/invoices/{}/delete/", invoice_id))
            .await
    }

    async fn mark_invoice_sent(&mut self, invoice_id: u64) -> DeskResult<()> {
        self.send_unit::<()>(
            Method::POST,
            &format!("/api/invoices/{}/mark-sent/", invoice_id),
            None,
        )
        .await
    }

    async fn mark_invoice_paid(&mut self, invoice_id: u64) -> DeskResult<()> {
        self.send_unit::<()>(
            Method::POST,
            &format!("/api/invoices/{}/mark-paid/", invoice_id),
            None,
        )
        .await
    }

    async fn invoice_summary(&self) -> DeskResult<InvoiceSummary> {
        self.get("/api/invoices/summary/").await
    }

    async fn list_payments(&self) -> DeskResult<Vec<Payment>> {
        self.get("/api/payments/").await
    }

    async fn add_payment(&mut self, payment: &Payment) -> DeskResult<Payment> {
        self.send_json(Method::POST, "/api/payments/add/", payment).await
    }

    async fn list_accounts(&self) -> DeskResult<Vec<ChartAccount>> {
        self.get("/api/chart-of-accounts/").await
    }

    async fn add_account(&mut self, account: &ChartAccount) -> DeskResult<ChartAccount> {
        self.send_json(Method::POST, "/api/chart-of-accounts/add/", account)
            .await
    }

    async fn edit_account(&mut self, account: &ChartAccount) -> DeskResult<ChartAccount> {
        let id = account.id.ok_or_else(|| {
            DeskError::Validation(format!("account {} has no id", account.account_code))
        })?;
        // The endpoint answers with a status message, not the account
        self.send_unit(
            Method::POST,
            &format!("/api/chart-of-accounts/{}/edit/", id),
            Some(account),
        )
        .await?;
        Ok(account.clone())
    }

    async fn delete_account(&mut self, account_id: u64) -> DeskResult<()> {
        self.delete(&format!("/api/chart-of-accounts/{}/delete/", account_id))
            .await
    }

    async fn list_documents(&self, kind: DocumentKind) -> DeskResult<Vec<LedgerDocument>> {
        let values: Vec<Value> = self.get(document_base(kind)?).await?;
        values
            .into_iter()
            .map(|v| decode_document(v, kind))
            .collect()
    }

    async fn create_document(&mut self, document: &LedgerDocument) -> DeskResult<LedgerDocument> {
        let path = format!("{}create/", document_base(document.kind)?);
        let value: Value = self.send_json(Method::POST, &path, document).await?;
        decode_document(value, document.kind)
    }

    async fn update_document(&mut self, document: &LedgerDocument) -> DeskResult<LedgerDocument> {
        let id = document.id.ok_or_else(|| {
            DeskError::Validation(format!("{} {} has no id", document.kind, document.number))
        })?;
        let path = format!("{}{}/update/", document_base(document.kind)?, id);
        let value: Value = self.send_json(Method::PUT, &path, document).await?;
        decode_document(value, document.kind)
    }

    async fn last_document_number(&self, kind: DocumentKind) -> DeskResult<u64> {
        let path = format!("{}last-number/", document_base(kind)?);
        let last: LastNumber = self.get(&path).await?;
        Ok(last.last_number)
    }

    async fn dashboard_metrics(&self) -> DeskResult<DashboardMetrics> {
        self.get("/api/dashboard/metrics/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_body() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"error": "Lead not found"}"#),
            "Lead not found"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message": "bad date"}"#),
            "bad date"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>"),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_document_kind_is_stamped() {
        let doc = decode_document(
            serde_json::json!({
                "id": 3,
                "expenseNumber": "EXP-0003",
                "date": "2024-01-18",
                "entries": []
            }),
            DocumentKind::Expense,
        )
        .unwrap();
        assert_eq!(doc.kind, DocumentKind::Expense);
        assert_eq!(doc.number, "EXP-0003");
    }

    #[test]
    fn test_invoices_have_no_document_endpoint() {
        assert!(document_base(DocumentKind::Invoice).is_err());
        assert_eq!(
            document_base(DocumentKind::Journal).unwrap(),
            "/api/manual-journals/"
        );
    }
}
