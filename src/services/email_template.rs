use crate::database::models::{OrderDetail, OrderStatus};

/// Escape text interpolated into HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn status_message(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "Vaša porudžbina je primljena i trenutno je u pripremi.",
        OrderStatus::Shipped => "Vaša porudžbina je poslata i uskoro stiže na vašu adresu.",
        OrderStatus::Delivered => "Vaša porudžbina je dostavljena. Hvala na kupovini!",
        OrderStatus::Cancelled => "Vaša porudžbina je otkazana. Za sva pitanja nas kontaktirajte.",
    }
}

pub fn status_subject(tenant_name: &str, status: OrderStatus) -> String {
    format!("{} - status porudžbine: {}", tenant_name, status.label())
}

/// HTML body of the order status notification.
pub fn status_change_html(tenant_name: &str, contact_email: Option<&str>, detail: &OrderDetail) -> String {
    let order = &detail.order;
    let mut html = String::new();

    html.push_str("<html><body style=\"font-family: Arial, sans-serif; color: #333;\">");
    html.push_str(&format!("<h2>{}</h2>", escape_html(tenant_name)));
    html.push_str(&format!("<p>Poštovani/a {},</p>", escape_html(&order.customer_name)));
    html.push_str(&format!("<p>{}</p>", status_message(order.status)));
    html.push_str(&format!(
        "<p><strong>Status:</strong> {}<br><strong>Broj porudžbine:</strong> {}<br><strong>Datum:</strong> {}</p>",
        escape_html(order.status.label()),
        order.id,
        order.order_time.format("%d.%m.%Y %H:%M")
    ));

    if !detail.order_items.is_empty() {
        html.push_str("<table style=\"border-collapse: collapse; width: 100%;\">");
        html.push_str("<tr><th align=\"left\">Proizvod</th><th align=\"right\">Količina</th><th align=\"right\">Cena</th><th align=\"right\">Ukupno</th></tr>");
        for item in &detail.order_items {
            let name = item.product_name.as_deref().unwrap_or("Proizvod");
            html.push_str(&format!(
                "<tr><td>{}</td><td align=\"right\">{}</td><td align=\"right\">{}</td><td align=\"right\">{}</td></tr>",
                escape_html(name),
                item.quantity,
                item.unit_price.round_dp(2),
                item.subtotal.round_dp(2)
            ));
        }
        html.push_str("</table>");
    }

    html.push_str(&format!("<p><strong>Ukupno:</strong> {} RSD</p>", order.total.round_dp(2)));

    if let Some(contact) = contact_email {
        html.push_str(&format!("<p>Kontakt: {}</p>", escape_html(contact)));
    }

    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Order, OrderItem};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn detail(status: OrderStatus) -> OrderDetail {
        let order_id = Uuid::new_v4();
        OrderDetail {
            order: Order {
                id: order_id,
                order_time: Utc::now(),
                status,
                buyer_id: None,
                customer_name: "Marko <script>".into(),
                customer_email: "marko@example.test".into(),
                customer_phone: None,
                total: Decimal::new(2500, 2),
                updated_at: None,
            },
            order_items: vec![OrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: None,
                product_name: Some("Ljuljaška".into()),
                quantity: 1,
                unit_price: Decimal::new(2500, 2),
                subtotal: Decimal::new(2500, 2),
            }],
        }
    }

    #[test]
    fn body_mentions_status_items_and_total() {
        let html = status_change_html("Acme", Some("shop@acme.test"), &detail(OrderStatus::Shipped));
        assert!(html.contains("Poslata"));
        assert!(html.contains("Ljuljaška"));
        assert!(html.contains("25.00"));
        assert!(html.contains("shop@acme.test"));
    }

    #[test]
    fn customer_input_is_escaped() {
        let html = status_change_html("Acme", None, &detail(OrderStatus::Pending));
        assert!(html.contains("Marko &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn subject_carries_label() {
        assert_eq!(
            status_subject("Acme", OrderStatus::Delivered),
            "Acme - status porudžbine: Dostavljena"
        );
    }
}
