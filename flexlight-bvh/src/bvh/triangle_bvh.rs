use glam::Vec3;

use crate::{
    Bvh, BvhArrays, BvhBuilder, BvhConfig, Error, Result, SplitStrategy,
    Triangle,
};

/// Static tree over the triangles of a single mesh prototype.
#[derive(Clone, Debug)]
pub struct TriangleBvh {
    bvh: Bvh<Triangle>,
}

impl TriangleBvh {
    pub fn build(triangles: Vec<Triangle>) -> Result<Self> {
        Self::build_with(triangles, Default::default())
    }

    pub fn build_with(
        triangles: Vec<Triangle>,
        config: BvhConfig,
    ) -> Result<Self> {
        let bvh = BvhBuilder::new(SplitStrategy::LongestAxis)
            .with_config(config)
            .build(triangles)?;

        Ok(Self { bvh })
    }

    /// Builds the tree out of a flat prototype array, where each triangle
    /// occupies [`DEFAULT_PROTOTYPE_STRIDE`](crate::DEFAULT_PROTOTYPE_STRIDE)
    /// floats, starting with its three vertex positions.
    pub fn from_prototype_array(array: &[f32]) -> Result<Self> {
        Self::from_prototype_array_with(array, Default::default())
    }

    pub fn from_prototype_array_with(
        array: &[f32],
        config: BvhConfig,
    ) -> Result<Self> {
        let triangles = triangles_from_prototype_array(
            array,
            config.prototype_stride,
        )?;

        Self::build_with(triangles, config)
    }

    pub fn bvh(&self) -> &Bvh<Triangle> {
        &self.bvh
    }

    pub fn into_bvh(self) -> Bvh<Triangle> {
        self.bvh
    }

    pub fn to_arrays(&self) -> BvhArrays {
        self.bvh.to_arrays()
    }
}

/// Slices a flat `[v v v n n n uv uv uv ...]`-style array into triangles; only
/// the positions (first nine floats of each record) are read.
pub fn triangles_from_prototype_array(
    array: &[f32],
    stride: usize,
) -> Result<Vec<Triangle>> {
    if stride < 9 {
        return Err(Error::InvalidStride { stride });
    }

    if array.len() % stride != 0 {
        return Err(Error::MalformedPrototype {
            len: array.len(),
            stride,
        });
    }

    if u32::try_from(array.len() / stride).is_err() {
        return Err(Error::TooManyElements {
            count: array.len() / stride,
        });
    }

    let triangles = array
        .chunks_exact(stride)
        .enumerate()
        .map(|(id, record)| {
            Triangle::new(
                Vec3::from_slice(&record[0..3]),
                Vec3::from_slice(&record[3..6]),
                Vec3::from_slice(&record[6..9]),
                id as u32,
            )
        })
        .collect();

    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use glam::vec3;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::{
        BvhElement, BvhTree, MaxDepth, TraversalOrder,
        BVH_MAX_LEAVES_PER_NODE, DEFAULT_PROTOTYPE_STRIDE,
    };

    fn prototype_record(vertices: [Vec3; 3]) -> Vec<f32> {
        let mut record = vec![0.0; DEFAULT_PROTOTYPE_STRIDE];

        for (idx, vertex) in vertices.iter().enumerate() {
            vertex.write_to_slice(&mut record[3 * idx..]);
        }

        // Normals, so that a mix-up with positions gets noticed
        record[9..18].fill(-7.0);
        record
    }

    fn random_triangles(rng: &mut StdRng, len: usize) -> Vec<Triangle> {
        (0..len)
            .map(|id| {
                let center = vec3(
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                );

                let mut vertex = || {
                    center
                        + vec3(
                            rng.gen_range(-2.0..2.0),
                            rng.gen_range(-2.0..2.0),
                            rng.gen_range(-2.0..2.0),
                        )
                };

                Triangle::new(vertex(), vertex(), vertex(), id as u32)
            })
            .collect()
    }

    fn assert_contains_exactly(bvh: &Bvh<Triangle>, len: usize) {
        let mut ids: Vec<_> = bvh.elements().map(|tri| tri.id).collect();

        ids.sort_unstable();

        assert_eq!((0..len as u32).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn from_prototype_array() {
        let array: Vec<f32> = [
            [vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)],
            [vec3(5.0, 5.0, 5.0), vec3(6.0, 5.0, 5.0), vec3(5.0, 6.0, 5.0)],
        ]
        .into_iter()
        .flat_map(prototype_record)
        .collect();

        let target = TriangleBvh::from_prototype_array(&array).unwrap();

        let BvhTree::Leaf(leaf) = target.bvh().root() else {
            panic!("expected a leaf");
        };

        assert_eq!(0, leaf.id());
        assert_eq!(2, leaf.len());
        assert_eq!(1, leaf.children()[1].id);
        assert_eq!(vec3(6.0, 5.0, 5.0), leaf.children()[1].b);
        assert_eq!(Vec3::ZERO, leaf.bounds().min());
        assert_eq!(vec3(6.0, 6.0, 5.0), leaf.bounds().max());
    }

    #[test]
    fn from_prototype_array_with_custom_stride() {
        let array = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
            2.0, 2.0, 2.0, 3.0, 2.0, 2.0, 2.0, 3.0, 2.0, //
        ];

        let config = BvhConfig::default().with_prototype_stride(9);
        let target =
            TriangleBvh::from_prototype_array_with(&array, config).unwrap();

        assert_contains_exactly(target.bvh(), 2);
    }

    #[test]
    fn malformed_prototype_array() {
        assert_eq!(
            Some(Error::MalformedPrototype { len: 25, stride: 24 }),
            TriangleBvh::from_prototype_array(&[0.0; 25]).err()
        );

        assert_eq!(
            Some(Error::InvalidStride { stride: 6 }),
            TriangleBvh::from_prototype_array_with(
                &[0.0; 12],
                BvhConfig::default().with_prototype_stride(6)
            )
            .err()
        );

        let mut array = prototype_record([Vec3::ZERO, Vec3::X, Vec3::Y]);

        array.extend(prototype_record([Vec3::ZERO, Vec3::X, Vec3::Y]));
        array[DEFAULT_PROTOTYPE_STRIDE + 4] = f32::NAN;

        assert_eq!(
            Some(Error::NonFiniteElement { id: 1 }),
            TriangleBvh::from_prototype_array(&array).err()
        );
    }

    #[test]
    fn three_triangles_make_a_leaf() {
        let mut rng = StdRng::seed_from_u64(1);
        let target = TriangleBvh::build(random_triangles(&mut rng, 3)).unwrap();

        assert!(target.bvh().root().is_leaf());
        assert_eq!(1, target.bvh().len());
    }

    #[test]
    fn outlier_gets_its_own_leaf() {
        let tri =
            |at: Vec3, id| Triangle::new(at, at + Vec3::X, at + Vec3::Z, id);

        let target = TriangleBvh::build(vec![
            tri(vec3(0.0, 0.0, 0.0), 0),
            tri(vec3(0.5, 0.0, 0.0), 1),
            tri(vec3(0.0, 0.5, 0.0), 2),
            tri(vec3(100.0, 0.0, 0.0), 3),
            tri(vec3(0.5, 0.5, 0.0), 4),
        ])
        .unwrap();

        let BvhTree::Node(root) = target.bvh().root() else {
            panic!("expected a node");
        };

        assert_eq!(2, root.len());

        let BvhTree::Leaf(cluster) = &root.children()[0] else {
            panic!("expected a leaf");
        };

        let BvhTree::Leaf(outlier) = &root.children()[1] else {
            panic!("expected a leaf");
        };

        assert_eq!(
            vec![0, 1, 2, 4],
            cluster.iter().map(|tri| tri.id).collect::<Vec<_>>()
        );

        assert_eq!(vec![3], outlier.iter().map(|tri| tri.id).collect::<Vec<_>>());
        assert_eq!(vec3(100.0, 0.0, 0.0), outlier.bounds().min());
    }

    #[test]
    fn coincident_triangles_terminate() {
        let triangles = (0..37)
            .map(|id| Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, id))
            .collect();

        let target = TriangleBvh::build(triangles).unwrap();

        assert_contains_exactly(target.bvh(), 37);

        // 37 -> (10, 10, 10, 7) -> leaves of up to 3
        assert_eq!(3, target.bvh().depth());
    }

    #[test]
    fn crossing_triangles_split_along_other_axis() {
        let mut rng = StdRng::seed_from_u64(20);

        // Every triangle spans the whole box along x, so no x plane separates
        // any of them; y does, cleanly
        let mut triangles: Vec<_> = (0..20)
            .map(|id| {
                let y = id as f32;

                Triangle::new(
                    vec3(-100.0, y, 0.0),
                    vec3(100.0, y, 0.0),
                    vec3(0.0, y, 1.0),
                    id,
                )
            })
            .collect();

        triangles.shuffle(&mut rng);

        let target = TriangleBvh::build(triangles).unwrap();

        assert_contains_exactly(target.bvh(), 20);

        let BvhTree::Node(root) = target.bvh().root() else {
            panic!("expected a node");
        };

        let [below, above] = root.children() else {
            panic!("expected two children, got {}", root.len());
        };

        assert_eq!(0.0, below.bounds().min().y);
        assert_eq!(9.0, below.bounds().max().y);
        assert_eq!(10.0, above.bounds().min().y);
        assert_eq!(19.0, above.bounds().max().y);

        // Same all the way down: siblings never overlap along y
        target.bvh().walk(|tree| {
            let BvhTree::Node(node) = tree else {
                return;
            };

            for pair in node.children().windows(2) {
                assert!(pair[0].bounds().max().y < pair[1].bounds().min().y);
            }
        });
    }

    #[test]
    fn random_clouds() {
        let mut rng = StdRng::seed_from_u64(1234);

        for len in [0, 1, 4, 5, 17, 100, 1000] {
            let triangles = random_triangles(&mut rng, len);

            for order in [TraversalOrder::DepthFirst, TraversalOrder::BreadthFirst]
            {
                let config = BvhConfig::default().with_order(order);
                let target =
                    TriangleBvh::build_with(triangles.clone(), config).unwrap();

                let bvh = target.bvh();

                // Containment completeness: no element lost or duplicated
                assert_contains_exactly(bvh, len);

                // Leaf size bound & bounding soundness
                bvh.validate(config.bias);

                for leaf in bvh.leaves() {
                    assert!(leaf.len() <= BVH_MAX_LEAVES_PER_NODE);

                    for tri in leaf {
                        assert!(leaf.bounds().contains_box(&tri.bounds(), 0.0));
                    }
                }

                // Id = row
                let arrays = target.to_arrays();

                assert_eq!(bvh.len(), arrays.len());
                assert_eq!(arrays, target.to_arrays());
            }
        }
    }

    #[test]
    fn depth_limit_fans_out() {
        let mut rng = StdRng::seed_from_u64(99);
        let triangles = random_triangles(&mut rng, 200);

        let config = BvhConfig::default().with_max_depth(MaxDepth::Limited(0));
        let target = TriangleBvh::build_with(triangles, config).unwrap();

        assert_contains_exactly(target.bvh(), 200);

        let BvhTree::Node(root) = target.bvh().root() else {
            panic!("expected a node");
        };

        // Root still gets split spatially; only its children are fanned out,
        // which keeps the tree shallow
        assert!(root.len() >= 2);
        assert!(target.bvh().depth() <= 6);
    }

    #[test]
    fn breadth_first_ids() {
        let mut rng = StdRng::seed_from_u64(5);
        let config =
            BvhConfig::default().with_order(TraversalOrder::BreadthFirst);

        let target =
            TriangleBvh::build_with(random_triangles(&mut rng, 64), config)
                .unwrap();

        let BvhTree::Node(root) = target.bvh().root() else {
            panic!("expected a node");
        };

        assert_eq!(0, root.id());

        // Root's children come right after it
        for (idx, child) in root.iter().enumerate() {
            assert_eq!(1 + idx as u32, child.id());
        }
    }
}
