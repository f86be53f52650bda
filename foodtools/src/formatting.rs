use std::fmt::Write;

use anyhow::Result;
use foodflow_engine::{
    db_types::MenuItem,
    order_objects::OrderWithItems,
};
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};

use crate::cart::Cart;

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

pub fn format_menu(restaurant_id: i64, menu: &[MenuItem]) -> String {
    if menu.is_empty() {
        return format!("Restaurant #{restaurant_id} has no menu items");
    }
    let mut table = Table::new();
    table.set_titles(row!["ID", "Item", "Price", "Available"]);
    menu.iter().for_each(|item| {
        table.add_row(row![item.id, item.name, item.price.to_string(), if item.available { "yes" } else { "no" }]);
    });
    markdown_style(&mut table);
    format!("# Menu for restaurant #{restaurant_id}\n{table}")
}

pub fn format_orders(orders: &[OrderWithItems]) -> String {
    if orders.is_empty() {
        return "No orders yet".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row!["ID", "Restaurant", "Total", "Status", "Payment", "Method", "Placed at"]);
    orders.iter().for_each(|o| {
        table.add_row(row![
            o.order.id,
            o.order.restaurant_id,
            o.order.total_amount.to_string(),
            o.order.status.to_string(),
            o.order.payment_status.to_string(),
            o.order.payment_method.to_string(),
            o.order.created_at.to_string()
        ]);
    });
    markdown_style(&mut table);
    format!("{table}\n")
}

pub fn format_order(order: &OrderWithItems) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "Order #{}", order.order.id)?;
    writeln!(f, "Restaurant: #{}", order.order.restaurant_id)?;
    writeln!(f, "Status: {} ({})", order.order.status, order.order.payment_status)?;
    writeln!(f, "Deliver to: {}", order.order.delivery_address)?;
    writeln!(f, "Placed at: {}", order.order.created_at)?;
    let mut table = Table::new();
    table.set_titles(row!["Item", "Price", "Qty", "Subtotal"]);
    order.items.iter().for_each(|item| {
        table.add_row(row![
            item.name,
            item.unit_price.to_string(),
            item.quantity,
            (item.unit_price * item.quantity).to_string()
        ]);
    });
    markdown_style(&mut table);
    writeln!(f, "{table}")?;
    writeln!(f, "Total: {}", order.order.total_amount)?;
    Ok(f)
}

pub fn format_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "The cart is empty".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row!["Item ID", "Item", "Price", "Qty", "Subtotal"]);
    cart.items.iter().for_each(|line| {
        table.add_row(row![
            line.menu_item_id,
            line.name,
            line.unit_price.to_string(),
            line.quantity,
            (line.unit_price * line.quantity).to_string()
        ]);
    });
    markdown_style(&mut table);
    let restaurant = cart.restaurant.map(|r| format!("#{r}")).unwrap_or_default();
    format!("# Cart (restaurant {restaurant})\n{table}\nTotal: {}", cart.total())
}
