use std::cmp::Ordering;

use glam::{Mat4, Vec3, Vec4};

use crate::error::{PipelineError, Result};
use crate::renderer::lights::{BakeType, LightBuffer, LightKind, PackedLight, VisibleLight};
use crate::settings::MixedLightAlpha;

/// Empirical falloff shaping: quadratic attenuation reaches 1/26 at the range.
const QUADRATIC_ATTENUATION: f32 = 25.0;

/// Output of one collection pass.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectedLights {
    pub buffer: LightBuffer,
    /// First kept light with shadows enabled.
    pub shadow_light: Option<VisibleLight>,
}

/// Sorts and packs the visible lights of one camera into a [`LightBuffer`].
#[derive(Clone, Copy, Debug)]
pub struct LightCollector {
    max_lights: usize,
    mixed_alpha: MixedLightAlpha,
}

impl LightCollector {
    pub fn new(max_lights: usize, mixed_alpha: MixedLightAlpha) -> Self {
        Self {
            max_lights,
            mixed_alpha,
        }
    }

    pub fn max_lights(&self) -> usize {
        self.max_lights
    }

    /// Sorts `lights` in place, then packs up to `max_lights` realtime lights.
    ///
    /// Baked lights are skipped. An unsupported light kind is logged and keeps
    /// its slot zeroed.
    pub fn collect(
        &self,
        lights: &mut [VisibleLight],
        view: &Mat4,
        camera_position: Vec3,
    ) -> CollectedLights {
        sort_lights(lights, camera_position);

        let mut buffer = LightBuffer::new(self.max_lights);
        let mut shadow_light = None;

        for visible in lights.iter() {
            if buffer.is_full() {
                break;
            }
            if visible.light.bake_type == BakeType::Baked {
                continue;
            }

            let packed = match pack_light(visible, view, self.mixed_alpha) {
                Ok(packed) => packed,
                Err(err) => {
                    log::error!("{}", err);
                    PackedLight::default()
                }
            };
            buffer.push(packed);

            if visible.light.shadows && shadow_light.is_none() {
                shadow_light = Some(visible.clone());
            }
        }

        log::trace!(
            "Packed {} of {} visible lights (shadow light: {:?})",
            buffer.count,
            lights.len(),
            shadow_light.as_ref().map(|l| l.light.name.as_str())
        );

        CollectedLights {
            buffer,
            shadow_light,
        }
    }
}

/// Stable sort: baked lights last, directional lights first, then nearest first.
pub fn sort_lights(lights: &mut [VisibleLight], camera_position: Vec3) {
    lights.sort_by(|a, b| compare_lights(a, b, camera_position));
}

fn compare_lights(a: &VisibleLight, b: &VisibleLight, camera_position: Vec3) -> Ordering {
    let baked = |l: &VisibleLight| l.light.bake_type == BakeType::Baked;
    let not_directional = |l: &VisibleLight| !l.light.kind.is_directional();

    baked(a)
        .cmp(&baked(b))
        .then_with(|| not_directional(a).cmp(&not_directional(b)))
        .then_with(|| {
            let da = (a.position() - camera_position).length_squared();
            let db = (b.position() - camera_position).length_squared();
            da.total_cmp(&db)
        })
}

/// Packs one light into view space.
///
/// Attenuation layout: `(cos outer, 1 / (cos inner - cos outer), quadratic, range²)`;
/// the `(-1, 1)` pair in the first two lanes marks lights without a cone.
pub fn pack_light(
    visible: &VisibleLight,
    view: &Mat4,
    mixed_alpha: MixedLightAlpha,
) -> Result<PackedLight> {
    let light = &visible.light;

    let mut color = light.final_color();
    color.w = mixed_alpha.alpha(light.bake_type == BakeType::Mixed);

    match light.kind {
        LightKind::Directional => {
            let dir = view.transform_vector3(visible.forward());
            Ok(PackedLight {
                color,
                position: (-dir).extend(0.0),
                attenuation: Vec4::new(-1.0, 1.0, 0.0, 0.0),
                spot_direction: Vec4::ZERO,
            })
        }
        LightKind::Point { range } => {
            let pos = view.transform_point3(visible.position());
            let range_sq = range * range;
            Ok(PackedLight {
                color,
                position: pos.extend(1.0),
                attenuation: Vec4::new(-1.0, 1.0, QUADRATIC_ATTENUATION / range_sq, range_sq),
                spot_direction: Vec4::ZERO,
            })
        }
        LightKind::Spot { range, angle } => {
            let pos = view.transform_point3(visible.position());
            let dir = view.transform_vector3(visible.forward());
            let range_sq = range * range;

            let rad = angle.to_radians();
            let cos_inner = (rad * 0.25).cos();
            let cos_outer = (rad * 0.5).cos();

            Ok(PackedLight {
                color,
                position: pos.extend(1.0),
                attenuation: Vec4::new(
                    cos_outer,
                    1.0 / (cos_inner - cos_outer),
                    QUADRATIC_ATTENUATION / range_sq,
                    range_sq,
                ),
                spot_direction: (-dir).extend(0.0),
            })
        }
        LightKind::Area { .. } => Err(PipelineError::UnsupportedLightType {
            light: light.name.clone(),
            kind: light.kind,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::lights::Light;
    use crate::scene::Transform;
    use glam::{Quat, Vec2};

    const EPS: f32 = 1e-5;

    fn light_at(name: &str, kind: LightKind, position: Vec3) -> VisibleLight {
        VisibleLight::new(
            Light::new(name, kind, Vec3::ONE, 1.0),
            Transform::from_translation(position),
        )
    }

    fn names(lights: &[VisibleLight]) -> Vec<&str> {
        lights.iter().map(|l| l.light.name.as_str()).collect()
    }

    #[test]
    fn sort_puts_directional_first_and_baked_last() {
        let mut lights = vec![
            light_at("far", LightKind::Point { range: 5.0 }, Vec3::new(0.0, 0.0, 20.0)),
            VisibleLight {
                light: Light::new("baked", LightKind::Point { range: 5.0 }, Vec3::ONE, 1.0)
                    .with_bake_type(BakeType::Baked),
                transform: Transform::IDENTITY,
            },
            light_at("near", LightKind::Point { range: 5.0 }, Vec3::new(0.0, 0.0, 2.0)),
            light_at("sun", LightKind::Directional, Vec3::new(100.0, 100.0, 100.0)),
        ];

        sort_lights(&mut lights, Vec3::ZERO);
        assert_eq!(names(&lights), ["sun", "near", "far", "baked"]);
    }

    #[test]
    fn sort_tolerates_nan_positions() {
        let mut lights = vec![
            light_at("far", LightKind::Point { range: 5.0 }, Vec3::new(0.0, 0.0, 20.0)),
            light_at("lost", LightKind::Point { range: 5.0 }, Vec3::splat(f32::NAN)),
            light_at("near", LightKind::Point { range: 5.0 }, Vec3::new(0.0, 0.0, 2.0)),
            light_at("mid", LightKind::Point { range: 5.0 }, Vec3::new(0.0, 0.0, 8.0)),
            light_at("sun", LightKind::Directional, Vec3::ZERO),
        ];

        sort_lights(&mut lights, Vec3::ZERO);
        let finite: Vec<_> = names(&lights).into_iter().filter(|n| *n != "lost").collect();
        assert_eq!(finite, ["sun", "near", "mid", "far"]);
        assert_eq!(lights.len(), 5);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut lights = vec![
            light_at("a", LightKind::Directional, Vec3::X),
            light_at("b", LightKind::Directional, Vec3::X),
            light_at("c", LightKind::Directional, Vec3::X),
        ];
        sort_lights(&mut lights, Vec3::ZERO);
        assert_eq!(names(&lights), ["a", "b", "c"]);
    }

    #[test]
    fn point_attenuation_encodes_range() {
        let range = 4.0;
        let visible = light_at("p", LightKind::Point { range }, Vec3::new(1.0, 2.0, 3.0));
        let packed = pack_light(&visible, &Mat4::IDENTITY, MixedLightAlpha::ZeroForMixed).unwrap();

        assert_eq!(packed.position, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(packed.attenuation.x, -1.0);
        assert_eq!(packed.attenuation.y, 1.0);
        assert!((packed.attenuation.z - 25.0 / 16.0).abs() < EPS);
        assert!((packed.attenuation.w - 16.0).abs() < EPS);
        assert_eq!(packed.color.w, 1.0);
    }

    #[test]
    fn directional_packs_negated_view_space_forward() {
        let rotation = Quat::from_rotation_arc(Vec3::Z, Vec3::NEG_Y);
        let visible = VisibleLight::new(
            Light::new("sun", LightKind::Directional, Vec3::ONE, 1.0),
            Transform::from_trs(Vec3::new(5.0, 5.0, 5.0), rotation, Vec3::ONE),
        );
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let packed = pack_light(&visible, &view, MixedLightAlpha::ZeroForMixed).unwrap();

        // Light points down; in this view space "towards the light" is +Y.
        assert!(packed.position.abs_diff_eq(Vec4::new(0.0, 1.0, 0.0, 0.0), EPS));
        assert_eq!(packed.attenuation, Vec4::new(-1.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn spot_attenuation_uses_cone_cosines() {
        let visible = VisibleLight::new(
            Light::new(
                "spot",
                LightKind::Spot {
                    range: 10.0,
                    angle: 60.0,
                },
                Vec3::ONE,
                1.0,
            ),
            Transform::from_translation(Vec3::new(0.0, 3.0, 0.0)),
        );
        let packed = pack_light(&visible, &Mat4::IDENTITY, MixedLightAlpha::ZeroForMixed).unwrap();

        let cos_outer = 30f32.to_radians().cos();
        let cos_inner = 15f32.to_radians().cos();
        assert!((packed.attenuation.x - cos_outer).abs() < EPS);
        assert!((packed.attenuation.y - 1.0 / (cos_inner - cos_outer)).abs() < 1e-3);
        assert!((packed.attenuation.w - 100.0).abs() < EPS);
        assert!(packed.spot_direction.abs_diff_eq(Vec4::new(0.0, 0.0, -1.0, 0.0), EPS));
        assert_eq!(packed.position, Vec4::new(0.0, 3.0, 0.0, 1.0));
    }

    #[test]
    fn mixed_light_alpha_follows_policy() {
        let mut visible = light_at("m", LightKind::Point { range: 2.0 }, Vec3::ZERO);
        visible.light.bake_type = BakeType::Mixed;

        let zero = pack_light(&visible, &Mat4::IDENTITY, MixedLightAlpha::ZeroForMixed).unwrap();
        let one = pack_light(&visible, &Mat4::IDENTITY, MixedLightAlpha::OneForMixed).unwrap();
        assert_eq!(zero.color.w, 0.0);
        assert_eq!(one.color.w, 1.0);
    }

    #[test]
    fn area_light_is_unsupported() {
        let visible = light_at(
            "panel",
            LightKind::Area {
                range: 3.0,
                size: Vec2::ONE,
            },
            Vec3::ZERO,
        );
        let err = pack_light(&visible, &Mat4::IDENTITY, MixedLightAlpha::ZeroForMixed).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedLightType { ref light, .. } if light == "panel"));
    }

    #[test]
    fn area_light_keeps_a_zeroed_slot() {
        let collector = LightCollector::new(4, MixedLightAlpha::ZeroForMixed);
        let mut lights = vec![
            light_at(
                "panel",
                LightKind::Area {
                    range: 3.0,
                    size: Vec2::ONE,
                },
                Vec3::new(0.0, 0.0, 1.0),
            ),
            light_at("bulb", LightKind::Point { range: 3.0 }, Vec3::new(0.0, 0.0, 2.0)),
        ];

        let collected = collector.collect(&mut lights, &Mat4::IDENTITY, Vec3::ZERO);
        assert_eq!(collected.buffer.count, 2);
        assert_eq!(collected.buffer.get(0).unwrap(), PackedLight::default());
        assert_eq!(collected.buffer.positions[1], Vec4::new(0.0, 0.0, 2.0, 1.0));
    }

    #[test]
    fn only_first_shadow_light_is_selected() {
        let collector = LightCollector::new(8, MixedLightAlpha::ZeroForMixed);
        let mut near = light_at("near", LightKind::Point { range: 3.0 }, Vec3::new(1.0, 0.0, 0.0));
        near.light = near.light.with_shadows(0.7, 0.02);
        let mut far = light_at("far", LightKind::Point { range: 3.0 }, Vec3::new(9.0, 0.0, 0.0));
        far.light = far.light.with_shadows(1.0, 0.05);
        let mut lights = vec![far, near];

        let collected = collector.collect(&mut lights, &Mat4::IDENTITY, Vec3::ZERO);
        let shadow = collected.shadow_light.expect("shadow light");
        assert_eq!(shadow.light.name, "near");
    }

    #[test]
    fn shadow_light_beyond_cap_is_not_selected() {
        let collector = LightCollector::new(1, MixedLightAlpha::ZeroForMixed);
        let near = light_at("near", LightKind::Point { range: 3.0 }, Vec3::X);
        let mut far = light_at("far", LightKind::Point { range: 3.0 }, Vec3::new(9.0, 0.0, 0.0));
        far.light = far.light.with_shadows(1.0, 0.05);
        let mut lights = vec![far, near];

        let collected = collector.collect(&mut lights, &Mat4::IDENTITY, Vec3::ZERO);
        assert_eq!(collected.buffer.count, 1);
        assert!(collected.shadow_light.is_none());
    }
}
