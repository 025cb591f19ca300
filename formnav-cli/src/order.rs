use std::{cell::RefCell, rc::Rc};

use formnav::FieldDescriptor;
use serde::Serialize;

use crate::widgets::{Button, FieldWidget, Select, TextInput};

pub const ORDER_TYPES: &[&str] = &["production", "stock"];
pub const MATERIAL_TYPES: &[&str] = &["steel", "aluminium", "copper", "polymer"];

pub const ORDER_TYPE: &str = "order_type";
pub const CUSTOMER: &str = "customer";
pub const CUSTOMER_REF: &str = "customer_ref";
pub const DELIVERY_DATE: &str = "delivery_date";
pub const PRODUCT: &str = "product";
pub const MATERIAL_TYPE: &str = "material_type";
pub const MATERIAL_NAME: &str = "material_name";
pub const QUANTITY: &str = "quantity";
pub const UNIT_WEIGHT: &str = "unit_weight";
pub const NOTES: &str = "notes";
pub const SUBMIT: &str = "submit";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Order {
    /// One-line summary shown by the print shortcut.
    pub fn preview(&self) -> String {
        let mut line = format!(
            "Print preview: {} order • {} x {}",
            self.order_type, self.quantity, self.product
        );
        if let Some(customer) = &self.customer {
            line.push_str(&format!(" • for {customer}"));
        }
        if let Some(material) = self.material_name.as_ref().or(self.material_type.as_ref()) {
            line.push_str(&format!(" • {material}"));
        }
        if let Some(total) = self.total_weight {
            line.push_str(&format!(" • {total:.2} kg"));
        }
        line
    }
}

/// Why an order cannot be stored, and which field to send the user back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A rendered row of the form.
pub struct FieldSlot {
    pub id: &'static str,
    pub label: &'static str,
    pub widget: FieldWidget,
}

/// The order-entry form. Widgets are shared with the navigator registry.
pub struct OrderForm {
    pub order_type: Rc<RefCell<Select>>,
    pub customer: Rc<RefCell<TextInput>>,
    pub customer_ref: Rc<RefCell<TextInput>>,
    pub delivery_date: Rc<RefCell<TextInput>>,
    pub product: Rc<RefCell<TextInput>>,
    pub material_type: Rc<RefCell<Select>>,
    pub material_name: Rc<RefCell<TextInput>>,
    pub quantity: Rc<RefCell<TextInput>>,
    pub unit_weight: Rc<RefCell<TextInput>>,
    pub notes: Rc<RefCell<TextInput>>,
    pub submit: Rc<RefCell<Button>>,
}

impl Default for OrderForm {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderForm {
    pub fn new() -> Self {
        let text = || Rc::new(RefCell::new(TextInput::default()));
        Self {
            order_type: Rc::new(RefCell::new(
                Select::new(ORDER_TYPES).with_selected("production"),
            )),
            customer: text(),
            customer_ref: text(),
            delivery_date: text(),
            product: text(),
            material_type: Rc::new(RefCell::new(Select::new(MATERIAL_TYPES))),
            material_name: text(),
            quantity: text(),
            unit_weight: text(),
            notes: text(),
            submit: Rc::new(RefCell::new(Button::new("Submit order"))),
        }
    }

    pub fn slots(&self) -> Vec<FieldSlot> {
        let text = |id, label, input: &Rc<RefCell<TextInput>>| FieldSlot {
            id,
            label,
            widget: FieldWidget::Text(Rc::clone(input)),
        };
        let select = |id, label, select: &Rc<RefCell<Select>>| FieldSlot {
            id,
            label,
            widget: FieldWidget::Select(Rc::clone(select)),
        };
        vec![
            select(ORDER_TYPE, "Order type", &self.order_type),
            text(CUSTOMER, "Customer", &self.customer),
            text(CUSTOMER_REF, "Customer ref", &self.customer_ref),
            text(DELIVERY_DATE, "Delivery date", &self.delivery_date),
            text(PRODUCT, "Product", &self.product),
            select(MATERIAL_TYPE, "Material type", &self.material_type),
            text(MATERIAL_NAME, "Material name", &self.material_name),
            text(QUANTITY, "Quantity", &self.quantity),
            text(UNIT_WEIGHT, "Unit weight (kg)", &self.unit_weight),
            text(NOTES, "Notes", &self.notes),
            FieldSlot {
                id: SUBMIT,
                label: "",
                widget: FieldWidget::Button(Rc::clone(&self.submit)),
            },
        ]
    }

    pub fn is_stock(&self) -> bool {
        self.order_type.borrow().selected() == Some("stock")
    }

    /// Builds the navigation registry for the current order type.
    ///
    /// Material name follows the material type selection live; the stock
    /// branch is structural, so the host rebuilds the registry when the order
    /// type changes.
    pub fn descriptors(&self) -> Vec<FieldDescriptor<FieldWidget>> {
        let stock = self.is_stock();
        self.slots()
            .into_iter()
            .map(|slot| {
                let descriptor = FieldDescriptor::new(slot.id, slot.widget);
                match slot.id {
                    MATERIAL_NAME => {
                        let material = Rc::clone(&self.material_type);
                        descriptor.enabled_when(move || material.borrow().selected().is_some())
                    }
                    CUSTOMER if stock => descriptor.next(PRODUCT),
                    _ => descriptor,
                }
            })
            .collect()
    }

    /// The select whose option list is currently open, if any.
    pub fn open_select(&self) -> Option<Rc<RefCell<Select>>> {
        [&self.order_type, &self.material_type]
            .into_iter()
            .find(|select| select.borrow().is_open())
            .map(Rc::clone)
    }

    pub fn to_order(&self) -> Result<Order, FieldIssue> {
        let order_type = self
            .order_type
            .borrow()
            .selected()
            .ok_or_else(|| FieldIssue::new(ORDER_TYPE, "Choose an order type"))?;
        let customer = self.customer.borrow().trimmed();
        if order_type == "production" && customer.is_none() {
            return Err(FieldIssue::new(
                CUSTOMER,
                "Production orders need a customer",
            ));
        }
        let product = self
            .product
            .borrow()
            .trimmed()
            .ok_or_else(|| FieldIssue::new(PRODUCT, "Product is required"))?;

        let quantity = self
            .quantity
            .borrow()
            .trimmed()
            .ok_or_else(|| FieldIssue::new(QUANTITY, "Quantity is required"))?;
        let quantity = quantity
            .parse::<u32>()
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| FieldIssue::new(QUANTITY, "Quantity must be a positive whole number"))?;

        let unit_weight = match self.unit_weight.borrow().trimmed() {
            Some(raw) => Some(
                raw.replace(',', ".")
                    .parse::<f64>()
                    .ok()
                    .filter(|weight| weight.is_finite() && *weight > 0.0)
                    .ok_or_else(|| {
                        FieldIssue::new(UNIT_WEIGHT, "Unit weight must be a positive number")
                    })?,
            ),
            None => None,
        };

        let material_type = self.material_type.borrow().selected().map(str::to_string);
        let material_name = material_type
            .as_ref()
            .and_then(|_| self.material_name.borrow().trimmed());

        Ok(Order {
            order_type: order_type.to_string(),
            customer,
            customer_ref: self.customer_ref.borrow().trimmed(),
            delivery_date: self.delivery_date.borrow().trimmed(),
            product,
            material_type,
            material_name,
            quantity,
            unit_weight,
            total_weight: unit_weight.map(|weight| weight * f64::from(quantity)),
            notes: self.notes.borrow().trimmed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use formnav::FieldSequencer;

    use super::*;

    fn type_into(input: &Rc<RefCell<TextInput>>, text: &str) {
        for ch in text.chars() {
            input
                .borrow_mut()
                .handle_key(&KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    fn choose(select: &Rc<RefCell<Select>>, value: &'static str) {
        let options = select.borrow().options();
        *select.borrow_mut() = Select::new(options).with_selected(value);
        assert_eq!(select.borrow().selected(), Some(value));
    }

    #[test]
    fn material_name_follows_material_type() {
        let form = OrderForm::new();
        let mut sequencer = FieldSequencer::new(form.descriptors());
        sequencer.focus_field(PRODUCT);
        sequencer.focus_next();
        form.material_type
            .borrow_mut()
            .handle_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(sequencer.focus_next().target(), Some(QUANTITY));

        choose(&form.material_type, "copper");
        sequencer.focus_field(MATERIAL_TYPE);
        assert_eq!(sequencer.focus_next().target(), Some(MATERIAL_NAME));
    }

    #[test]
    fn stock_orders_skip_customer_reference_fields() {
        let form = OrderForm::new();
        choose(&form.order_type, "stock");
        let mut sequencer = FieldSequencer::new(form.descriptors());
        sequencer.focus_field(CUSTOMER);
        assert_eq!(sequencer.focus_next().target(), Some(PRODUCT));
        assert_eq!(sequencer.focus_previous().target(), Some(DELIVERY_DATE));
    }

    #[test]
    fn submit_is_the_last_field() {
        let form = OrderForm::new();
        let mut sequencer = FieldSequencer::new(form.descriptors());
        sequencer.focus_field(NOTES);
        assert_eq!(sequencer.focus_next().target(), Some(SUBMIT));
        assert!(!sequencer.focus_next().moved());
    }

    #[test]
    fn production_orders_require_a_customer() {
        let form = OrderForm::new();
        type_into(&form.product, "Cable drum");
        type_into(&form.quantity, "4");
        let issue = form.to_order().expect_err("customer missing");
        assert_eq!(issue.field, CUSTOMER);

        choose(&form.order_type, "stock");
        let order = form.to_order().expect("stock order");
        assert_eq!(order.customer, None);
        assert_eq!(order.quantity, 4);
    }

    #[test]
    fn quantity_must_be_positive() {
        let form = OrderForm::new();
        type_into(&form.customer, "ACME");
        type_into(&form.product, "Cable drum");
        type_into(&form.quantity, "0");
        let issue = form.to_order().expect_err("zero quantity");
        assert_eq!(issue.field, QUANTITY);
    }

    #[test]
    fn total_weight_is_derived_and_serialized() {
        let form = OrderForm::new();
        type_into(&form.customer, "ACME");
        type_into(&form.product, "Cable drum");
        type_into(&form.quantity, "3");
        type_into(&form.unit_weight, "1,5");
        let order = form.to_order().expect("order");
        assert_eq!(order.total_weight, Some(4.5));
        let json = serde_json::to_value(&order).expect("json");
        assert_eq!(json["orderType"], "production");
        assert_eq!(json["totalWeight"], 4.5);
        assert!(json.get("notes").is_none());
        assert!(order.preview().contains("3 x Cable drum"));
    }

    #[test]
    fn material_name_is_dropped_without_material_type() {
        let form = OrderForm::new();
        type_into(&form.customer, "ACME");
        type_into(&form.product, "Cable drum");
        type_into(&form.quantity, "1");
        type_into(&form.material_name, "C101");
        assert_eq!(form.to_order().expect("order").material_name, None);
    }
}
