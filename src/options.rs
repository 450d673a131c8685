//! Shape options and the derived parameter set.

/// Lowest accepted number of elements around each atrium.
pub const MIN_ELEMENTS_AROUND_ATRIA: usize = 6;

/// Largest accepted atrial major axis rotation, in degrees either way.
pub const MAX_ATRIA_ROTATION_DEGREES: f64 = 75.0;

/// Shape options as supplied by the caller. Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshOptions {
    /// Elements around the LV free wall.
    pub elements_around_lv_free_wall: usize,
    /// Elements around the ventricular septum.
    pub elements_around_septum: usize,
    /// Elements around each atrium.
    pub elements_around_atria: usize,
    /// Outer radius of the LV at the base.
    pub lv_outer_radius: f64,
    /// LV free wall thickness.
    pub lv_free_wall_thickness: f64,
    /// RV free wall thickness, also the atrial inlet slope length.
    pub rv_free_wall_thickness: f64,
    /// Radial displacement of the ventricular septum at the base.
    pub septum_base_radial_displacement: f64,
    /// Atrial septum thickness.
    pub atrial_septum_thickness: f64,
    /// Rotation of the atrial major axes away from the septal line.
    pub atria_major_axis_rotation_degrees: f64,
    /// Height of the base plane above the ventricle rim.
    pub base_height: f64,
    /// Thickness of the base plane.
    pub base_thickness: f64,
    /// LV outlet inner diameter.
    pub lv_outlet_inner_diameter: f64,
    /// LV outlet wall thickness.
    pub lv_outlet_wall_thickness: f64,
    /// RV outlet inner diameter.
    pub rv_outlet_inner_diameter: f64,
    /// RV outlet wall thickness.
    pub rv_outlet_wall_thickness: f64,
    /// Length of outlet elements along the outlet axis.
    pub outlet_element_length: f64,
    /// Incline of the outlets from the base plane.
    pub outlet_incline_degrees: f64,
    /// Gap between the two outlets.
    pub outlet_spacing: f64,
    /// Whether to refine the mesh after building it.
    pub refine: bool,
    /// Refined elements along each surface direction.
    pub refine_elements_surface: usize,
    /// Refined elements through the LV wall.
    pub refine_elements_through_lv_wall: usize,
    /// Refined elements through the RV wall.
    pub refine_elements_through_rv_wall: usize,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            elements_around_lv_free_wall: 5,
            elements_around_septum: 6,
            elements_around_atria: 7,
            lv_outer_radius: 0.5,
            lv_free_wall_thickness: 0.12,
            rv_free_wall_thickness: 0.05,
            septum_base_radial_displacement: 0.1,
            atrial_septum_thickness: 0.06,
            atria_major_axis_rotation_degrees: 40.0,
            base_height: 0.1,
            base_thickness: 0.06,
            lv_outlet_inner_diameter: 0.3,
            lv_outlet_wall_thickness: 0.02,
            rv_outlet_inner_diameter: 0.3,
            rv_outlet_wall_thickness: 0.02,
            outlet_element_length: 0.1,
            outlet_incline_degrees: 15.0,
            outlet_spacing: 0.04,
            refine: false,
            refine_elements_surface: 4,
            refine_elements_through_lv_wall: 1,
            refine_elements_through_rv_wall: 1,
        }
    }
}

impl MeshOptions {
    /// Clamps the options into range and derives the shape parameters.
    ///
    /// Never fails: lengths below zero become zero, the atrial rotation is
    /// limited to `[-75, 75]` degrees, the atrial element count is raised to
    /// at least 6, and refinement counts are made usable. The surface count
    /// must be even so refined elements conform across hanging nodes.
    #[must_use]
    pub fn resolve(&self) -> ShapeParameters {
        let length = |v: f64| v.max(0.0);
        let lv_outlet_inner_radius = 0.5 * length(self.lv_outlet_inner_diameter);
        let rv_outlet_inner_radius = 0.5 * length(self.rv_outlet_inner_diameter);
        let mut refine_surface = self.refine_elements_surface.max(1);
        if refine_surface % 2 == 1 {
            refine_surface += 1;
        }
        ShapeParameters {
            elements_around_lv_free_wall: self.elements_around_lv_free_wall,
            elements_around_septum: self.elements_around_septum,
            elements_around_atria: self.elements_around_atria.max(MIN_ELEMENTS_AROUND_ATRIA),
            lv_outer_radius: length(self.lv_outer_radius),
            lv_free_wall_thickness: length(self.lv_free_wall_thickness),
            rv_free_wall_thickness: length(self.rv_free_wall_thickness),
            septum_base_radial_displacement: length(self.septum_base_radial_displacement),
            atrial_septum_thickness: length(self.atrial_septum_thickness),
            atria_major_axis_rotation: self
                .atria_major_axis_rotation_degrees
                .clamp(-MAX_ATRIA_ROTATION_DEGREES, MAX_ATRIA_ROTATION_DEGREES)
                .to_radians(),
            base_height: length(self.base_height),
            base_thickness: length(self.base_thickness),
            lv_outlet_inner_radius,
            lv_outlet_outer_radius: lv_outlet_inner_radius + length(self.lv_outlet_wall_thickness),
            rv_outlet_inner_radius,
            rv_outlet_outer_radius: rv_outlet_inner_radius + length(self.rv_outlet_wall_thickness),
            outlet_element_length: length(self.outlet_element_length),
            outlet_incline: self.outlet_incline_degrees.to_radians(),
            outlet_spacing: length(self.outlet_spacing),
            refine: self.refine,
            refine_elements_surface: refine_surface,
            refine_elements_through_lv_wall: self.refine_elements_through_lv_wall.max(1),
            refine_elements_through_rv_wall: self.refine_elements_through_rv_wall.max(1),
        }
    }
}

/// Derived shape parameters. Angles are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeParameters {
    /// Elements around the LV free wall.
    pub elements_around_lv_free_wall: usize,
    /// Elements around the ventricular septum.
    pub elements_around_septum: usize,
    /// Elements around each atrium, at least 6.
    pub elements_around_atria: usize,
    /// Outer radius of the LV at the base.
    pub lv_outer_radius: f64,
    /// LV free wall thickness.
    pub lv_free_wall_thickness: f64,
    /// RV free wall thickness.
    pub rv_free_wall_thickness: f64,
    /// Radial displacement of the ventricular septum at the base.
    pub septum_base_radial_displacement: f64,
    /// Atrial septum thickness.
    pub atrial_septum_thickness: f64,
    /// Atrial major axis rotation, within 75 degrees of zero.
    pub atria_major_axis_rotation: f64,
    /// Height of the base plane.
    pub base_height: f64,
    /// Thickness of the base plane.
    pub base_thickness: f64,
    /// LV outlet inner radius.
    pub lv_outlet_inner_radius: f64,
    /// LV outlet outer radius.
    pub lv_outlet_outer_radius: f64,
    /// RV outlet inner radius.
    pub rv_outlet_inner_radius: f64,
    /// RV outlet outer radius.
    pub rv_outlet_outer_radius: f64,
    /// Length of outlet elements along the outlet axis.
    pub outlet_element_length: f64,
    /// Outlet incline.
    pub outlet_incline: f64,
    /// Gap between the two outlets.
    pub outlet_spacing: f64,
    /// Whether to refine after building.
    pub refine: bool,
    /// Refined elements along each surface direction, even.
    pub refine_elements_surface: usize,
    /// Refined elements through the LV wall.
    pub refine_elements_through_lv_wall: usize,
    /// Refined elements through the RV wall.
    pub refine_elements_through_rv_wall: usize,
}

impl ShapeParameters {
    /// Elements around the LV.
    #[must_use]
    pub fn elements_around_lv(&self) -> usize {
        self.elements_around_lv_free_wall + self.elements_around_septum
    }

    /// Combined base height and thickness, the scale of crest derivatives.
    #[must_use]
    pub fn base_depth(&self) -> f64 {
        self.base_height + self.base_thickness
    }
}
