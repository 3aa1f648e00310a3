//! Квитанция об оплате в виде одностраничного PDF.
//!
//! Документ фиксированной вёрстки: заголовок и строки "поле: значение",
//! шрифт Helvetica из стандартного набора PDF, без внешних ресурсов.

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::Payment;
use crate::repository::Store;

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub name: String,
    pub hotel: String,
    pub amount: f64,
    pub txn_id: String,
    pub order_id: String,
    pub paid_at: DateTime<Utc>,
}

impl Receipt {
    pub fn from_payment(name: &str, payment: &Payment) -> Self {
        Receipt {
            name: name.to_string(),
            hotel: payment.hotel.clone(),
            amount: payment.amount,
            txn_id: payment.txn_id.clone(),
            order_id: payment.order_id.clone(),
            paid_at: payment.created_at,
        }
    }

    pub fn filename(&self) -> String {
        format!("receipt_{}.pdf", self.txn_id)
    }

    fn lines(&self) -> Vec<(String, String)> {
        vec![
            ("Name".to_string(), self.name.clone()),
            ("Hotel".to_string(), self.hotel.clone()),
            ("Amount".to_string(), format!("{:.2}", self.amount)),
            ("Transaction ID".to_string(), self.txn_id.clone()),
            ("Order ID".to_string(), self.order_id.clone()),
            ("Paid at".to_string(), self.paid_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        ]
    }

    /// Рендерит PDF 1.4: каталог, дерево страниц, страница A4, шрифт и поток содержимого.
    pub fn render_pdf(&self) -> Vec<u8> {
        let mut content = text_op(20, 770, "Payment Receipt");
        let mut y = 730;
        for (label, value) in self.lines() {
            content.push_str(&text_op(12, y, &format!("{}: {}", label, value)));
            y -= 22;
        }
        content.push_str(&text_op(10, y - 20, "Thank you for booking with us."));

        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
            format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
        ];

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
        }

        let xref_at = out.len();
        out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in &offsets {
            out.push_str(&format!("{:010} 00000 n \n", offset));
        }
        out.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        ));
        out.into_bytes()
    }
}

// Одна строка текста на странице: кегль, вертикальная позиция, текст
fn text_op(size: u32, y: i32, text: &str) -> String {
    format!("BT /F1 {} Tf 72 {} Td ({}) Tj ET\n", size, y, pdf_text(text))
}

// Строка PDF: экранируем скобки и обратный слэш, не-ASCII заменяем на '?'
fn pdf_text(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            c if c.is_ascii() && !c.is_ascii_control() => c.to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

/// Ищет платёж по transaction id среди платежей пользователя.
/// Чужой или несуществующий платёж - `NotFound`, документ не создаётся.
pub async fn fetch_receipt<S: Store>(
    store: &S,
    user_id: i64,
    username: &str,
    txn_id: &str,
) -> Result<Receipt, AppError> {
    let payment = store
        .find_payment_for_user(txn_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Receipt not found!".to_string()))?;
    Ok(Receipt::from_payment(username, &payment))
}
