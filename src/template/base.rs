//! Templates of the base plane elements.
//!
//! Element corners are numbered with xi1 fastest: corners 0 to 3 lie on the
//! inner (endocardial) surface and 4 to 7 on the outer one. Each function
//! returns the template of one element position around the base; elements
//! sharing a layout share a template.

use crate::error::AssemblyError;

use super::{
    minus, plus, ElementTemplate, TemplateBuilder, TemplateId, TemplateRegistry,
    ValueLabel::{D1, D12, D2, D3},
    HANGING_SCALE_FACTORS,
};

type Built = Result<ElementTemplate, AssemblyError>;

/// Number of LV-side base elements.
pub const LV_ELEMENTS: usize = 10;

/// Number of RV-side base elements.
pub const RV_ELEMENTS: usize = 12;

/// Template identifiers for each base element position, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseTemplates {
    /// LV-side elements, from the septal crux round to the free wall.
    pub lv: [TemplateId; LV_ELEMENTS],
    /// RV-side elements, from the septum round the RA to the outlet.
    pub rv: [TemplateId; RV_ELEMENTS],
}

impl BaseTemplates {
    /// Declares every base template and adds it to `registry`, reusing
    /// templates an earlier call already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if a template declaration is invalid.
    pub fn register(registry: &mut TemplateRegistry) -> Result<Self, AssemblyError> {
        let regular = registry.intern(TemplateBuilder::tricubic("regular").build()?);
        let lv_outlet_id = registry.intern(lv_outlet(false)?);
        let lv = [
            registry.intern(lv_septum_crux()?),
            registry.intern(lv_crux()?),
            registry.intern(lv_crux_outlet()?),
            registry.intern(lv_outlet_ra()?),
            registry.intern(lv_outlet(true)?),
            lv_outlet_id,
            lv_outlet_id,
            regular,
            regular,
            regular,
        ];
        let rv = [
            registry.intern(rv_septum()?),
            regular,
            regular,
            registry.intern(rv_ra_crest_approach()?),
            registry.intern(rv_crest()?),
            registry.intern(rv_hanging_crest()?),
            registry.intern(rv_hanging_outlet()?),
            registry.intern(rv_outlet_wall()?),
            registry.intern(rv_ra_crux()?),
            registry.intern(rv_crest_wedge()?),
            registry.intern(rv_outlet_crest()?),
            registry.intern(rv_outlet_septum()?),
        ];
        Ok(Self { lv, rv })
    }
}

fn lv_septum_crux() -> Built {
    TemplateBuilder::tricubic("lv septum crux")
        .with_scale_factors(1)
        .reverse(&[4], &[D1])
        .remap(&[0, 2], D3, &[plus(D1), plus(D3)])
        .remap(&[4, 6], D3, &[plus(D1), minus(D3)])
        .remap(&[6, 7], D1, &[minus(D1)])
        .reverse(&[7], &[D3])
        .build()
}

fn lv_crux() -> Built {
    TemplateBuilder::tricubic("lv crux")
        .with_scale_factors(1)
        .remap(&[3], D3, &[minus(D1), plus(D3)])
        .reverse(&[6], &[D1, D3])
        .remap(&[7], D3, &[minus(D1), minus(D3)])
        .remap(&[7], D1, &[minus(D1)])
        .build()
}

fn lv_crux_outlet() -> Built {
    TemplateBuilder::tricubic("lv crux outlet")
        .with_scale_factors(1)
        .remap(&[0], D1, &[plus(D1), plus(D2)])
        .remap(&[1], D1, &[plus(D2)])
        .linear_derivative(&[1, 3], D2, 1, 3)
        .linear_derivative(&[1, 5], D3, 1, 5)
        .remap(&[2], D3, &[minus(D1), plus(D3)])
        .remap(&[2], D1, &[plus(D3)])
        .remap(&[3], D1, &[plus(D1), minus(D3)])
        .remap(&[3, 7], D3, &[])
        .remap(&[5, 7], D2, &[])
        .remap(&[4], D1, &[plus(D1), minus(D3)])
        .remap(&[5], D1, &[minus(D1), plus(D2)])
        .remap(&[6], D3, &[minus(D1), minus(D3)])
        .remap(&[6], D1, &[plus(D3)])
        .remap(&[7], D1, &[minus(D1), minus(D3)])
        .collapse([0, 1, 2, 3, 4, 3, 5, 3])
}

fn lv_outlet_ra() -> Built {
    TemplateBuilder::tricubic("lv outlet ra")
        .with_scale_factors(1)
        .remap(&[0, 1, 2, 3], D2, &[])
        .remap(&[0], D3, &[plus(D1), minus(D2)])
        .remap(&[1], D3, &[minus(D2)])
        .remap(&[2], D3, &[plus(D1), plus(D3)])
        .remap(&[4], D3, &[minus(D1), plus(D3)])
        .remap(&[5], D3, &[minus(D2), plus(D3)])
        .remap(&[5], D2, &[minus(D1), plus(D2)])
        .reverse(&[6, 7], &[D1, D3])
        .collapse([0, 1, 0, 1, 2, 3, 4, 5])
}

/// LV elements below the LV outlet, linear through the outlet wall.
fn lv_outlet(first: bool) -> Built {
    let mut builder = TemplateBuilder::tricubic(if first { "lv outlet first" } else { "lv outlet" })
        .with_scale_factors(1)
        .linear_derivative(&[2, 6], D3, 2, 6)
        .linear_derivative(&[3, 7], D3, 3, 7);
    if first {
        builder = builder
            .remap(&[0], D2, &[plus(D1), plus(D2)])
            .remap(&[4], D2, &[plus(D1), minus(D3)])
            .remap(&[6], D2, &[minus(D1), plus(D2)]);
    }
    builder
        .remap(&[4, 5], D2, &[plus(D2), minus(D3)])
        .build()
}

fn rv_septum() -> Built {
    TemplateBuilder::tricubic("rv septum")
        .with_scale_factors(1)
        .remap(&[0, 2], D1, &[plus(D1), plus(D3)])
        .remap(&[1, 3], D1, &[plus(D1), minus(D3)])
        .build()
}

fn rv_ra_crest_approach() -> Built {
    TemplateBuilder::tricubic("rv ra crest approach")
        .remap(&[3, 7], D2, &[plus(D1), plus(D2)])
        .build()
}

fn rv_crest() -> Built {
    TemplateBuilder::tricubic("rv crest")
        .with_scale_factors(1)
        .remap(&[2, 6], D1, &[minus(D2)])
        .remap(&[2, 6], D2, &[plus(D1), plus(D2)])
        .build()
}

fn rv_hanging_crest() -> Built {
    TemplateBuilder::tricubic("rv hanging crest")
        .with_scale_factors(HANGING_SCALE_FACTORS.len())
        .midside_xi1_hanging(1, 0, 0, 1)
        .midside_xi1_hanging(5, 4, 4, 5)
        .linear_derivative(&[3, 7], D3, 3, 7)
        .remap(&[3, 7], D2, &[minus(D1), plus(D2)])
        .remap(&[3, 7], D1, &[plus(D2)])
        .build()
}

fn rv_hanging_outlet() -> Built {
    TemplateBuilder::tricubic("rv hanging outlet")
        .with_scale_factors(HANGING_SCALE_FACTORS.len())
        .midside_xi1_hanging(0, 1, 0, 1)
        .midside_xi1_hanging(4, 5, 4, 5)
        .linear_derivative(&[2, 6], D3, 2, 6)
        .linear_derivative(&[3, 7], D3, 3, 7)
        .remap(&[2, 6], D2, &[minus(D1), plus(D2)])
        .build()
}

fn rv_outlet_wall() -> Built {
    TemplateBuilder::tricubic("rv outlet wall")
        .with_scale_factors(1)
        .linear_derivative(&[2, 6], D3, 2, 6)
        .linear_derivative(&[3, 7], D3, 3, 7)
        .build()
}

fn rv_ra_crux() -> Built {
    TemplateBuilder::tricubic("rv ra crux")
        .with_scale_factors(1)
        .remap(&[0, 4], D1, &[plus(D1), minus(D2)])
        .remap(&[0, 4], D2, &[plus(D1)])
        .remap(&[1], D1, &[plus(D1), minus(D2)])
        .remap(&[1, 3], D2, &[minus(D1)])
        .remap(&[1], D3, &[plus(D2), minus(D3)])
        .remap(&[2], D1, &[minus(D2)])
        .remap(&[2], D2, &[plus(D1)])
        .remap(&[3], D1, &[plus(D1), minus(D2)])
        .remap(&[3], D3, &[plus(D2), minus(D3)])
        .remap(&[5], D1, &[plus(D1), minus(D3)])
        .remap(&[5], D2, &[minus(D1)])
        .remap(&[5, 7], D3, &[plus(D2)])
        .remap(&[6, 7], D1, &[])
        .remap(&[6], D2, &[minus(D1), minus(D3)])
        .remap(&[6], D3, &[minus(D3)])
        .remap(&[7], D2, &[minus(D1)])
        .collapse([0, 1, 2, 3, 4, 5, 6, 6])
}

fn rv_crest_wedge() -> Built {
    TemplateBuilder::tricubic("rv crest wedge")
        .with_scale_factors(1)
        .remap(&[0, 2, 4, 6], D2, &[])
        .remap(&[0, 4], D1, &[minus(D2)])
        .remap(&[2, 6], D1, &[plus(D1), minus(D2)])
        .remap(&[3], D1, &[plus(D1), minus(D2)])
        .remap(&[3], D2, &[minus(D2)])
        .remap(&[3], D3, &[plus(D2), minus(D3)])
        .remap(&[7], D1, &[plus(D1), minus(D3)])
        .remap(&[7], D2, &[minus(D3)])
        .remap(&[7], D3, &[plus(D2)])
        .collapse([0, 1, 0, 2, 3, 4, 3, 5])
}

fn rv_outlet_crest() -> Built {
    TemplateBuilder::tricubic("rv outlet crest")
        .with_scale_factors(1)
        .linear_derivative(&[1, 5], D3, 1, 5)
        .linear_derivative(&[3, 7], D3, 3, 7)
        .remap(&[1, 3, 5, 7], D2, &[minus(D1)])
        .remap(&[1, 3, 5, 7], D1, &[plus(D2)])
        .remap(&[2], D1, &[plus(D1), plus(D2)])
        .remap(&[2], D2, &[minus(D2)])
        .remap(&[2], D3, &[plus(D2), minus(D3)])
        .remap(&[6], D1, &[plus(D1), plus(D3)])
        .remap(&[6], D2, &[minus(D3)])
        .remap(&[6], D3, &[plus(D2)])
        .build()
}

fn rv_outlet_septum() -> Built {
    TemplateBuilder::tricubic("rv outlet septum")
        .with_scale_factors(1)
        .linear_derivative(&[1, 5], D3, 1, 5)
        .linear_derivative(&[3, 7], D3, 3, 7)
        .remap(&[0], D1, &[plus(D1), plus(D2)])
        .remap(&[2], D1, &[plus(D12)])
        .remap(&[0, 2], D2, &[plus(D1)])
        .remap(&[0, 2], D3, &[plus(D2), minus(D3)])
        .remap(&[1, 3], D2, &[minus(D1)])
        .remap(&[1, 3], D1, &[plus(D2)])
        .remap(&[2], D12, &[plus(D2)])
        .remap(&[4], D1, &[plus(D1), plus(D3)])
        .remap(&[4], D2, &[plus(D1)])
        .remap(&[4], D3, &[plus(D2)])
        .remap(&[5], D2, &[minus(D1)])
        .remap(&[5], D1, &[plus(D2)])
        .remap(&[6], D3, &[plus(D12)])
        .remap(&[6], D1, &[plus(D3)])
        .remap(&[6], D2, &[plus(D1)])
        .remap(&[6], D12, &[plus(D2)])
        .remap(&[7], D1, &[minus(D3)])
        .remap(&[7], D2, &[minus(D1)])
        .build()
}
