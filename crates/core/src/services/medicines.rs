//! Medicine catalog and stock tracking.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    Medicine, MedicineCategory, MedicineListQuery, NewMedicineRequest, UpdateMedicineRequest,
    DEFAULT_LOW_STOCK_THRESHOLD,
};
use crate::pagination::{paginate, Page};
use crate::store::Store;
use crate::{ClinicError, ClinicResult};

pub struct MedicineService {
    store: Arc<Store>,
}

impl MedicineService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Catalog listing over active medicines, alphabetical by name.
    pub fn list(&self, query: &MedicineListQuery) -> ClinicResult<Page<Medicine>> {
        let needle = query.search.as_ref().map(|s| s.to_lowercase());

        let mut medicines = self.store.medicines.find(|m| {
            m.is_active
                && needle.as_ref().map_or(true, |n| {
                    m.name.to_lowercase().contains(n)
                        || m.generic_name
                            .as_ref()
                            .is_some_and(|g| g.to_lowercase().contains(n))
                        || m.brand
                            .as_ref()
                            .is_some_and(|b| b.to_lowercase().contains(n))
                        || m.tags.iter().any(|t| t.to_lowercase().contains(n))
                })
                && query.category.map_or(true, |c| m.category == c)
                && query
                    .prescription_required
                    .map_or(true, |r| m.prescription_required == r)
                && query.min_price.map_or(true, |p| m.price >= p)
                && query.max_price.map_or(true, |p| m.price <= p)
                && (!query.in_stock.unwrap_or(false) || m.is_available())
        })?;
        medicines.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(paginate(medicines, query.page, query.limit))
    }

    pub fn get(&self, id: Uuid) -> ClinicResult<Medicine> {
        self.store
            .medicines
            .get(id)?
            .ok_or(ClinicError::NotFound("Medicine"))
    }

    pub fn create(&self, req: NewMedicineRequest) -> ClinicResult<Medicine> {
        if req.name.trim().is_empty() {
            return Err(ClinicError::InvalidInput("name is required".into()));
        }
        if req.price < 0.0 {
            return Err(ClinicError::InvalidInput(
                "price cannot be negative".into(),
            ));
        }

        let now = Utc::now();
        let medicine = Medicine {
            id: Uuid::new_v4(),
            name: req.name,
            generic_name: req.generic_name,
            brand: req.brand,
            category: req.category,
            description: req.description,
            dosage_form: req.dosage_form,
            strength: req.strength,
            price: req.price,
            stock_quantity: req.stock_quantity.unwrap_or(0),
            prescription_required: req.prescription_required.unwrap_or(false),
            side_effects: req.side_effects.unwrap_or_default(),
            contraindications: req.contraindications.unwrap_or_default(),
            manufacturer: req.manufacturer,
            expiry_date: req.expiry_date,
            is_active: true,
            tags: req.tags.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.store.medicines.insert(medicine.clone())?;
        Ok(medicine)
    }

    pub fn update(&self, id: Uuid, req: UpdateMedicineRequest) -> ClinicResult<Medicine> {
        if let Some(price) = req.price {
            if price < 0.0 {
                return Err(ClinicError::InvalidInput(
                    "price cannot be negative".into(),
                ));
            }
        }

        self.store
            .medicines
            .update(id, |m| {
                if let Some(v) = req.name.clone() {
                    m.name = v;
                }
                if let Some(v) = req.generic_name.clone() {
                    m.generic_name = Some(v);
                }
                if let Some(v) = req.brand.clone() {
                    m.brand = Some(v);
                }
                if let Some(v) = req.category {
                    m.category = v;
                }
                if let Some(v) = req.description.clone() {
                    m.description = Some(v);
                }
                if let Some(v) = req.dosage_form {
                    m.dosage_form = Some(v);
                }
                if let Some(v) = req.strength.clone() {
                    m.strength = Some(v);
                }
                if let Some(v) = req.price {
                    m.price = v;
                }
                if let Some(v) = req.stock_quantity {
                    m.stock_quantity = v;
                }
                if let Some(v) = req.prescription_required {
                    m.prescription_required = v;
                }
                if let Some(v) = req.side_effects.clone() {
                    m.side_effects = v;
                }
                if let Some(v) = req.contraindications.clone() {
                    m.contraindications = v;
                }
                if let Some(v) = req.manufacturer.clone() {
                    m.manufacturer = Some(v);
                }
                if let Some(v) = req.expiry_date {
                    m.expiry_date = Some(v);
                }
                if let Some(v) = req.tags.clone() {
                    m.tags = v;
                }
                m.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Medicine"))
    }

    /// Overwrites the stock counter. Stock has no reservation semantics.
    pub fn update_stock(&self, id: Uuid, stock_quantity: u32) -> ClinicResult<Medicine> {
        self.store
            .medicines
            .update(id, |m| {
                m.stock_quantity = stock_quantity;
                m.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Medicine"))
    }

    /// Soft delete: the record stays for prescription history, the catalog
    /// stops listing it.
    pub fn deactivate(&self, id: Uuid) -> ClinicResult<Medicine> {
        self.store
            .medicines
            .update(id, |m| {
                m.is_active = false;
                m.updated_at = Utc::now();
            })?
            .ok_or(ClinicError::NotFound("Medicine"))
    }

    /// Categories present in the active catalog.
    pub fn categories(&self) -> ClinicResult<Vec<MedicineCategory>> {
        let mut categories = Vec::new();
        for medicine in self.store.medicines.find(|m| m.is_active)? {
            if !categories.contains(&medicine.category) {
                categories.push(medicine.category);
            }
        }
        Ok(categories)
    }

    /// Active medicines at or below the threshold, most depleted first.
    pub fn low_stock(&self, threshold: Option<u32>) -> ClinicResult<Vec<Medicine>> {
        let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        let mut medicines = self
            .store
            .medicines
            .find(|m| m.is_active && m.stock_quantity <= threshold)?;
        medicines.sort_by_key(|m| m.stock_quantity);
        Ok(medicines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicineCategory;
    use tempfile::TempDir;

    fn new_request(name: &str, price: f64, stock: u32) -> NewMedicineRequest {
        NewMedicineRequest {
            name: name.into(),
            generic_name: None,
            brand: None,
            category: MedicineCategory::Painkiller,
            description: None,
            dosage_form: None,
            strength: None,
            price,
            stock_quantity: Some(stock),
            prescription_required: None,
            side_effects: None,
            contraindications: None,
            manufacturer: None,
            expiry_date: None,
            tags: None,
        }
    }

    fn service(dir: &TempDir) -> MedicineService {
        MedicineService::new(Arc::new(Store::open(dir.path()).unwrap()))
    }

    #[test]
    fn list_is_alphabetical_and_filters_price() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.create(new_request("Paracetamol", 3.0, 50)).unwrap();
        svc.create(new_request("Aspirin", 2.0, 50)).unwrap();
        svc.create(new_request("Morphine", 40.0, 50)).unwrap();

        let page = svc
            .list(&MedicineListQuery {
                max_price: Some(5.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].name, "Aspirin");
        assert_eq!(page.items[1].name, "Paracetamol");
    }

    #[test]
    fn search_matches_name_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.create(new_request("Ibuprofen", 4.0, 20)).unwrap();
        svc.create(new_request("Aspirin", 2.0, 20)).unwrap();

        let page = svc
            .list(&MedicineListQuery {
                search: Some("IBU".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Ibuprofen");
    }

    #[test]
    fn deactivated_medicine_leaves_the_catalog_but_not_the_store() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let medicine = svc.create(new_request("Aspirin", 2.0, 20)).unwrap();

        svc.deactivate(medicine.id).unwrap();

        let page = svc.list(&MedicineListQuery::default()).unwrap();
        assert_eq!(page.total, 0);
        assert!(!svc.get(medicine.id).unwrap().is_active);
    }

    #[test]
    fn in_stock_filter_drops_depleted_items() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.create(new_request("Aspirin", 2.0, 0)).unwrap();
        svc.create(new_request("Ibuprofen", 4.0, 5)).unwrap();

        let page = svc
            .list(&MedicineListQuery {
                in_stock: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Ibuprofen");
    }

    #[test]
    fn low_stock_orders_most_depleted_first() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        svc.create(new_request("Aspirin", 2.0, 8)).unwrap();
        svc.create(new_request("Ibuprofen", 4.0, 2)).unwrap();
        svc.create(new_request("Paracetamol", 3.0, 200)).unwrap();

        let low = svc.low_stock(None).unwrap();
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].name, "Ibuprofen");
    }

    #[test]
    fn negative_price_is_rejected() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        assert!(matches!(
            svc.create(new_request("Aspirin", -1.0, 10)),
            Err(ClinicError::InvalidInput(_))
        ));
    }
}
