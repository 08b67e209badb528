//! Camera and lens sub-forms.
//!
//! Each sub-form has two mutually exclusive input modes: pick an existing
//! item (and manufacturer) from the catalog, or type a new one. Picking an
//! item resolves its manufacturer by scanning the catalog, so choosing
//! "EOS R5" pre-selects "Canon" without another round trip.

use crate::api::types::{Equipment, EquipmentId, Manufacturer, ManufacturerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentKind {
    Camera,
    Lens,
}

impl EquipmentKind {
    /// The manufacturer's items of this kind.
    pub fn listing(self, manufacturer: &Manufacturer) -> &[Equipment] {
        match self {
            EquipmentKind::Camera => &manufacturer.cameras,
            EquipmentKind::Lens => &manufacturer.lenses,
        }
    }

    /// Form field prefix understood by the backend.
    pub fn prefix(self) -> &'static str {
        match self {
            EquipmentKind::Camera => "camera",
            EquipmentKind::Lens => "lens",
        }
    }
}

/// Find the manufacturer owning `id` by linear scan.
pub fn resolve_manufacturer<'a>(
    catalog: &'a [Manufacturer],
    kind: EquipmentKind,
    id: &EquipmentId,
) -> Option<&'a Manufacturer> {
    catalog
        .iter()
        .find(|mfr| kind.listing(mfr).iter().any(|item| &item.id == id))
}

/// One user action on a sub-form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipmentInput {
    SelectManufacturer(Option<ManufacturerId>),
    TypeManufacturer(String),
    Select(Option<EquipmentId>),
    TypeModel(String),
    /// Switch to entering a brand-new item.
    CreateNew,
}

/// State of a camera or lens sub-form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentFields {
    pub kind: EquipmentKind,
    pub id: Option<EquipmentId>,
    pub model: String,
    pub manufacturer_id: Option<ManufacturerId>,
    pub manufacturer_name: String,
    /// Manufacturer was filled in from the selected item, not by the user.
    manufacturer_resolved: bool,
}

impl EquipmentFields {
    pub fn new(kind: EquipmentKind) -> Self {
        Self {
            kind,
            id: None,
            model: String::new(),
            manufacturer_id: None,
            manufacturer_name: String::new(),
            manufacturer_resolved: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.model.is_empty()
            && self.manufacturer_id.is_none()
            && self.manufacturer_name.is_empty()
    }

    /// Whether the manufacturer came from resolving the selected item.
    pub fn manufacturer_resolved(&self) -> bool {
        self.manufacturer_resolved
    }

    /// Produce the next state. Fields the input doesn't touch carry over.
    pub fn apply(&self, input: EquipmentInput, catalog: &[Manufacturer]) -> Self {
        let mut next = self.clone();
        match input {
            EquipmentInput::SelectManufacturer(id) => {
                next.manufacturer_id = id;
                next.manufacturer_name.clear();
                next.manufacturer_resolved = false;
            }
            EquipmentInput::TypeManufacturer(name) => {
                next.manufacturer_id = None;
                next.manufacturer_name = name;
                next.manufacturer_resolved = false;
            }
            EquipmentInput::Select(None) => {
                next.id = None;
                next.model.clear();
                if next.manufacturer_resolved {
                    next.manufacturer_id = None;
                    next.manufacturer_name.clear();
                    next.manufacturer_resolved = false;
                }
            }
            EquipmentInput::Select(Some(id)) => {
                let owner = resolve_manufacturer(catalog, self.kind, &id);
                if owner.is_none() {
                    tracing::debug!(kind = self.kind.prefix(), id = %id, "Selected item has no known manufacturer");
                }
                next.manufacturer_id = owner.map(|mfr| mfr.id.clone());
                next.manufacturer_name.clear();
                next.manufacturer_resolved = owner.is_some();
                next.id = Some(id);
                next.model.clear();
            }
            EquipmentInput::TypeModel(model) => {
                next.id = None;
                next.model = model;
                next.manufacturer_resolved = false;
            }
            EquipmentInput::CreateNew => {
                next = Self::new(self.kind);
            }
        }
        next
    }

    /// Manufacturer dropdown is locked while a new name is being typed.
    pub fn manufacturer_selector_disabled(&self) -> bool {
        self.manufacturer_id.is_none() && !self.manufacturer_name.is_empty()
    }

    /// Manufacturer text entry is locked while one is selected.
    pub fn manufacturer_text_disabled(&self) -> bool {
        self.manufacturer_id.is_some()
    }

    /// Item dropdown is locked while a new model is being typed.
    pub fn selector_disabled(&self) -> bool {
        self.id.is_none() && !self.model.is_empty()
    }

    /// Model text entry is locked while an item is selected.
    pub fn model_text_disabled(&self) -> bool {
        self.id.is_some()
    }

    /// Items offered by the dropdown: everything, or only the selected manufacturer's.
    pub fn options<'a>(&self, catalog: &'a [Manufacturer]) -> Vec<&'a Equipment> {
        catalog
            .iter()
            .filter(|mfr| self.manufacturer_id.as_ref().map_or(true, |id| &mfr.id == id))
            .flat_map(|mfr| self.kind.listing(mfr).iter())
            .collect()
    }

    /// Multipart fields, e.g. `camera_id`, `camera_model`, `camera_manufacturer_name`.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let prefix = self.kind.prefix();
        let mut fields = Vec::new();
        if let Some(id) = &self.id {
            fields.push((format!("{}_id", prefix), id.to_string()));
        }
        if !self.model.is_empty() {
            fields.push((format!("{}_model", prefix), self.model.clone()));
        }
        if let Some(id) = &self.manufacturer_id {
            fields.push((format!("{}_manufacturer_id", prefix), id.to_string()));
        }
        if !self.manufacturer_name.is_empty() {
            fields.push((format!("{}_manufacturer_name", prefix), self.manufacturer_name.clone()));
        }
        fields
    }
}

/// Optical ranges, only meaningful for a lens typed in as new.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LensSpecs {
    pub aperture_min: Option<f64>,
    pub aperture_max: Option<f64>,
    pub focal_length_min: Option<f64>,
    pub focal_length_max: Option<f64>,
}

impl LensSpecs {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn form_fields(&self) -> Vec<(String, String)> {
        [
            ("lens_aperture_min", self.aperture_min),
            ("lens_aperture_max", self.aperture_max),
            ("lens_focal_length_min", self.focal_length_min),
            ("lens_focal_length_max", self.focal_length_max),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v.to_string())))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Manufacturer> {
        vec![
            Manufacturer {
                id: ManufacturerId("1".into()),
                name: "Nikon".into(),
                cameras: vec![Equipment { id: EquipmentId("10".into()), model: "Z6".into() }],
                lenses: vec![Equipment { id: EquipmentId("20".into()), model: "Z 50mm f/1.8".into() }],
            },
            Manufacturer {
                id: ManufacturerId("2".into()),
                name: "Canon".into(),
                cameras: vec![
                    Equipment { id: EquipmentId("11".into()), model: "EOS R5".into() },
                    Equipment { id: EquipmentId("12".into()), model: "EOS R6".into() },
                ],
                lenses: vec![],
            },
        ]
    }

    #[test]
    fn test_select_camera_resolves_manufacturer() {
        let catalog = catalog();
        let camera = EquipmentFields::new(EquipmentKind::Camera)
            .apply(EquipmentInput::Select(Some(EquipmentId("11".into()))), &catalog);

        assert_eq!(camera.id, Some(EquipmentId("11".into())));
        assert_eq!(camera.manufacturer_id, Some(ManufacturerId("2".into())));
        assert!(camera.manufacturer_name.is_empty());
        assert!(camera.manufacturer_resolved());
        assert!(camera.manufacturer_text_disabled());
        assert!(camera.model_text_disabled());
    }

    #[test]
    fn test_clearing_selection_reenables_manual_entry() {
        let catalog = catalog();
        let camera = EquipmentFields::new(EquipmentKind::Camera)
            .apply(EquipmentInput::Select(Some(EquipmentId("11".into()))), &catalog)
            .apply(EquipmentInput::Select(None), &catalog);

        assert_eq!(camera.id, None);
        assert_eq!(camera.manufacturer_id, None);
        assert!(!camera.manufacturer_text_disabled());
        assert!(!camera.model_text_disabled());
        assert!(camera.is_empty());
    }

    #[test]
    fn test_clearing_keeps_user_chosen_manufacturer() {
        let catalog = catalog();
        let camera = EquipmentFields::new(EquipmentKind::Camera)
            .apply(EquipmentInput::SelectManufacturer(Some(ManufacturerId("2".into()))), &catalog)
            .apply(EquipmentInput::TypeModel("EOS R8".into()), &catalog)
            .apply(EquipmentInput::Select(None), &catalog);

        assert_eq!(camera.manufacturer_id, Some(ManufacturerId("2".into())));
        assert!(camera.model.is_empty());
    }

    #[test]
    fn test_unknown_item_leaves_manufacturer_empty() {
        let camera = EquipmentFields::new(EquipmentKind::Camera)
            .apply(EquipmentInput::Select(Some(EquipmentId("99".into()))), &catalog());
        assert_eq!(camera.manufacturer_id, None);
        assert!(!camera.manufacturer_resolved());
    }

    #[test]
    fn test_typing_locks_selectors() {
        let catalog = catalog();
        let lens = EquipmentFields::new(EquipmentKind::Lens)
            .apply(EquipmentInput::TypeManufacturer("Sigma".into()), &catalog)
            .apply(EquipmentInput::TypeModel("Art 35mm".into()), &catalog);

        assert!(lens.manufacturer_selector_disabled());
        assert!(lens.selector_disabled());
        assert!(!lens.manufacturer_text_disabled());
        assert!(!lens.model_text_disabled());
    }

    #[test]
    fn test_create_new_clears_identifiers() {
        let catalog = catalog();
        let camera = EquipmentFields::new(EquipmentKind::Camera)
            .apply(EquipmentInput::Select(Some(EquipmentId("10".into()))), &catalog)
            .apply(EquipmentInput::CreateNew, &catalog);
        assert_eq!(camera, EquipmentFields::new(EquipmentKind::Camera));
    }

    #[test]
    fn test_options_filtered_by_manufacturer() {
        let catalog = catalog();
        let all = EquipmentFields::new(EquipmentKind::Camera);
        assert_eq!(all.options(&catalog).len(), 3);

        let canon = all.apply(EquipmentInput::SelectManufacturer(Some(ManufacturerId("2".into()))), &catalog);
        let models: Vec<_> = canon.options(&catalog).into_iter().map(|e| e.model.as_str()).collect();
        assert_eq!(models, vec!["EOS R5", "EOS R6"]);
    }

    #[test]
    fn test_lens_resolution_uses_lens_listing() {
        let catalog = catalog();
        assert_eq!(
            resolve_manufacturer(&catalog, EquipmentKind::Lens, &EquipmentId("20".into())).map(|m| m.name.as_str()),
            Some("Nikon")
        );
        assert!(resolve_manufacturer(&catalog, EquipmentKind::Lens, &EquipmentId("11".into())).is_none());
    }

    #[test]
    fn test_form_fields() {
        let catalog = catalog();
        let camera = EquipmentFields::new(EquipmentKind::Camera)
            .apply(EquipmentInput::Select(Some(EquipmentId("11".into()))), &catalog);
        assert_eq!(
            camera.form_fields(),
            vec![
                ("camera_id".to_string(), "11".to_string()),
                ("camera_manufacturer_id".to_string(), "2".to_string()),
            ]
        );

        let specs = LensSpecs { aperture_min: Some(1.4), ..Default::default() };
        assert_eq!(specs.form_fields(), vec![("lens_aperture_min".to_string(), "1.4".to_string())]);
    }
}
